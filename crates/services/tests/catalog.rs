//! Integration tests for the offline [`CatalogService`].

use std::io::Write;

use assert_matches::assert_matches;
use mentor_services::{CatalogService, LectureService, ServiceError};

const LECTURE: &str = "Intro to AI";

fn catalog_json() -> String {
    // Video 0 has six chunks so that two survive the excluded tail when
    // associating from the start of video 1.
    let chunks: Vec<String> = (0..6)
        .map(|i| {
            let embedding = if i == 1 { "[1.0, 0.0]" } else { "[0.0, 1.0]" };
            format!(r#"{{"chunk_index": {i}, "start_time": {}.0, "embedding": {embedding}}}"#, i * 10)
        })
        .collect();

    format!(
        r#"{{
          "lectures": [{{
            "name": "{LECTURE}",
            "videos": [
              {{
                "video_id": 0, "video_name": "Search", "fps": 25, "source": "media/search.mp4",
                "frames": [{{"frame_index": 30, "width": 1920, "height": 1080}}],
                "layouts": [{{"frame_index": 30, "boxes": [
                  {{"box_id": 1, "label": "title", "coordinate": [0, 0, 100, 50]}}
                ]}}],
                "explanations": [
                  {{"frame_index": 30, "box_id": 1, "text": "Uninformed search.", "embedding": [1.0, 0.0]}}
                ],
                "chunks": [{}]
              }},
              {{ "video_id": 1, "video_name": "Games" }}
            ]
          }}]
        }}"#,
        chunks.join(",")
    )
}

fn write_catalog() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(catalog_json().as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn load_reads_catalog_from_disk() {
    let file = write_catalog();
    let catalog = CatalogService::load(file.path()).unwrap();

    let videos = catalog.get_video_list(LECTURE).await.unwrap();
    let names: Vec<_> = videos.iter().map(|v| v.video_name.as_str()).collect();
    assert_eq!(names, vec!["Search", "Games"]);
}

#[tokio::test]
async fn missing_file_is_a_catalog_error() {
    let err = CatalogService::load("/definitely/not/here.json").unwrap_err();
    assert_matches!(err, ServiceError::Catalog(_));
}

#[test]
fn malformed_json_is_a_catalog_error() {
    assert_matches!(CatalogService::from_json("{"), Err(ServiceError::Catalog(_)));
}

#[tokio::test]
async fn frame_rate_and_metadata() {
    let catalog = CatalogService::from_json(&catalog_json()).unwrap();

    assert_eq!(catalog.get_frame_rate(LECTURE, 0).await.unwrap(), Some(25.0));
    assert_eq!(catalog.get_frame_rate(LECTURE, 1).await.unwrap(), None);
    assert_eq!(catalog.get_frame_metadata(LECTURE, 0).await.unwrap().len(), 1);
    assert!(catalog.get_frame_metadata(LECTURE, 1).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_lecture_or_video_is_not_found() {
    let catalog = CatalogService::from_json(&catalog_json()).unwrap();

    assert_matches!(
        catalog.get_video_list("Nope").await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        catalog.get_frame_rate(LECTURE, 9).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn annotations_and_explanations_by_frame() {
    let catalog = CatalogService::from_json(&catalog_json()).unwrap();

    let boxes = catalog.get_annotations(LECTURE, 0, 30).await.unwrap();
    assert_eq!(boxes[0].label, "title");
    assert_matches!(
        catalog.get_annotations(LECTURE, 0, 31).await,
        Err(ServiceError::NotFound(_))
    );

    let explanation = catalog.get_explanation(LECTURE, 0, 30, 1).await.unwrap();
    assert_eq!(explanation.text, "Uninformed search.");
    assert_matches!(
        catalog.get_explanation(LECTURE, 0, 30, 2).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn association_picks_best_prior_chunk() {
    let catalog = CatalogService::from_json(&catalog_json()).unwrap();
    let assoc = catalog
        .associate_context(LECTURE, 1, 0.0, &[1.0, 0.0])
        .await
        .unwrap();

    assert_eq!(assoc.video_id, 0);
    assert_eq!(assoc.start_time, 10.0);
    assert_eq!(assoc.label, "Search");
    assert!((assoc.similarity - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn association_with_too_little_history_is_not_found() {
    let catalog = CatalogService::from_json(&catalog_json()).unwrap();
    // Only chunks 0..=2 precede t=25s in video 0; all fall in the excluded tail.
    assert_matches!(
        catalog.associate_context(LECTURE, 0, 25.0, &[1.0, 0.0]).await,
        Err(ServiceError::NotFound(_))
    );
}

#[test]
fn video_url_uses_catalog_source() {
    let catalog = CatalogService::from_json(&catalog_json()).unwrap();
    assert_eq!(catalog.video_url(LECTURE, 0).as_deref(), Some("media/search.mp4"));
    assert_eq!(catalog.video_url(LECTURE, 1), None);
}
