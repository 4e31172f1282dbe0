use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::json;

use crate::common::{TestApp, build_zip, checksum_hex, routes, scene_archive, zip_part};

mod upload {
    use super::*;

    #[tokio::test]
    async fn new_scene_is_stored() {
        let app = TestApp::spawn().await;
        let archive = scene_archive();
        let checksum = checksum_hex(&archive);

        let res = app.upload_scene("shot.zip", archive, &checksum).await;

        assert_eq!(res.status, 201, "{}", res.text);
        let id = res.body["id"].as_str().unwrap();
        assert!(app.data.scenes_directory.join(format!("{id}.zip")).is_file());
        assert_eq!(app.temp_files(), 0);

        let index: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&app.data.scene_index).unwrap()).unwrap();
        assert_eq!(index["scenes"][0]["id"], id);
        assert_eq!(index["scenes"][0]["checksum"], checksum);
        assert_eq!(index["scenes"][0]["original_name"], "shot.zip");
    }

    #[tokio::test]
    async fn identical_upload_is_deduplicated() {
        let app = TestApp::spawn().await;
        let archive = scene_archive();
        let checksum = checksum_hex(&archive);

        let first = app.upload_scene("shot.zip", archive.clone(), &checksum).await;
        let second = app.upload_scene("renamed.zip", archive, &checksum).await;

        assert_eq!(first.status, 201);
        assert_eq!(second.status, 200);
        assert_eq!(first.body["id"], second.body["id"]);
        assert_eq!(app.stored_scene_files(), 1);

        let list = app.get(routes::SCENES).await;
        assert_eq!(list.body["scenes"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_upload_is_refused_while_one_streams() {
        let app = TestApp::spawn().await;
        let archive = scene_archive();
        let checksum = checksum_hex(&archive);

        let (tx, rx) = tokio::sync::mpsc::channel::<Result<Vec<u8>, std::io::Error>>(1);
        let chunks = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|chunk| (chunk, rx))
        });
        let part = Part::stream(reqwest::Body::wrap_stream(chunks))
            .file_name("slow.zip")
            .mime_str("application/zip")
            .unwrap();
        let form = Form::new()
            .text("metadata", json!({ "checksum": checksum }).to_string())
            .part("file", part);
        let request = app.client.post(app.url(routes::SCENES)).multipart(form);
        let slow = tokio::spawn(async move { request.send().await });

        let (head, tail) = archive.split_at(archive.len() / 2);
        tx.send(Ok(head.to_vec())).await.unwrap();
        for _ in 0..200 {
            if app.temp_files() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        assert_eq!(app.temp_files(), 1, "first upload never started streaming");

        let other = build_zip(&[("other/scene.blend", b"other")]);
        let other_checksum = checksum_hex(&other);
        let second = app
            .upload_scene("other.zip", other.clone(), &other_checksum)
            .await;
        assert_eq!(second.status, 503, "{}", second.text);
        assert_eq!(second.body["code"], "SERVICE_BUSY");
        assert!(second.headers.contains_key("retry-after"));

        tx.send(Ok(tail.to_vec())).await.unwrap();
        drop(tx);
        let first = slow.await.unwrap().unwrap();
        assert_eq!(first.status(), 201);
        assert_eq!(app.stored_scene_files(), 1);
        assert_eq!(app.temp_files(), 0);

        let retry = app.upload_scene("other.zip", other, &other_checksum).await;
        assert_eq!(retry.status, 201, "{}", retry.text);
    }

    #[tokio::test]
    async fn known_checksum_skips_the_file() {
        let app = TestApp::spawn().await;
        let archive = scene_archive();
        let checksum = checksum_hex(&archive);
        let first = app.upload_scene("shot.zip", archive, &checksum).await;

        let form = Form::new().text("metadata", json!({ "checksum": checksum }).to_string());
        let res = app.post_form(routes::SCENES, form).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], first.body["id"]);
    }

    #[tokio::test]
    async fn checksum_mismatch_leaves_no_trace() {
        let app = TestApp::spawn().await;
        let declared = checksum_hex(b"something else entirely");

        let res = app.upload_scene("shot.zip", scene_archive(), &declared).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "CHECKSUM_MISMATCH");
        assert_eq!(app.stored_scene_files(), 0);
        assert_eq!(app.temp_files(), 0);
        let list = app.get(routes::SCENES).await;
        assert!(list.body["scenes"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_upload_fails_checksum() {
        let app = TestApp::spawn().await;
        let declared = checksum_hex(&scene_archive());

        let res = app.upload_scene("empty.zip", Vec::new(), &declared).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "CHECKSUM_MISMATCH");
    }

    #[tokio::test]
    async fn non_zip_name_is_rejected() {
        let app = TestApp::spawn().await;
        let archive = scene_archive();
        let checksum = checksum_hex(&archive);

        let res = app.upload_scene("shot.blend", archive, &checksum).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.stored_scene_files(), 0);
    }

    #[tokio::test]
    async fn malformed_checksum_is_rejected() {
        let app = TestApp::spawn().await;

        for checksum in ["", "not-hex", "abcd"] {
            let res = app.upload_scene("shot.zip", scene_archive(), checksum).await;
            assert_eq!(res.status, 400, "checksum {checksum:?}");
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn missing_metadata_is_rejected() {
        let app = TestApp::spawn().await;
        let form = Form::new().part("file", zip_part("shot.zip", scene_archive()));

        let res = app.post_form(routes::SCENES, form).await;

        assert_eq!(res.status, 400);
        assert!(res.body["message"].as_str().unwrap().contains("metadata"));
        assert_eq!(app.stored_scene_files(), 0);
    }

    #[tokio::test]
    async fn metadata_without_file_is_rejected() {
        let app = TestApp::spawn().await;
        let checksum = checksum_hex(&scene_archive());
        let form = Form::new().text("metadata", json!({ "checksum": checksum }).to_string());

        let res = app.post_form(routes::SCENES, form).await;

        assert_eq!(res.status, 400);
        assert!(res.body["message"].as_str().unwrap().contains("file"));
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::SCENES).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body, json!({ "scenes": [] }));
    }

    #[tokio::test]
    async fn scenes_are_listed_in_upload_order() {
        let app = TestApp::spawn().await;
        let a = build_zip(&[("a.blend", b"a")]);
        let b = build_zip(&[("b.blend", b"b")]);
        let first = app.upload_scene("a.zip", a.clone(), &checksum_hex(&a)).await;
        let second = app.upload_scene("b.zip", b.clone(), &checksum_hex(&b)).await;

        let res = app.get(routes::SCENES).await;

        let scenes = res.body["scenes"].as_array().unwrap();
        assert_eq!(scenes.len(), 2);
        assert_eq!(scenes[0]["id"], first.body["id"]);
        assert_eq!(scenes[0]["original_name"], "a.zip");
        assert_eq!(scenes[1]["id"], second.body["id"]);
        assert!(scenes[0].get("checksum").is_none());
    }
}
