use std::io::Read;

use serde_json::json;

use crate::common::{TestApp, checksum_hex, routes, scene_archive};

mod status {
    use super::*;

    #[tokio::test]
    async fn idle_node_reports_no_request() {
        let app = TestApp::spawn().await;

        let res = app.get(routes::RENDER_STATUS).await;

        assert_eq!(res.status, 200);
        assert_eq!(
            res.body,
            json!({ "is_rendering": false, "request": null, "progress": null })
        );
    }
}

mod start {
    use super::*;

    #[tokio::test]
    async fn missing_field_is_a_validation_error() {
        let app = TestApp::spawn().await;
        let id = app.upload_default_scene().await;

        let res = app
            .post_json(routes::RENDER, &json!({ "id": id, "frame_start": 1 }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["message"].as_str().unwrap().contains("frame_end"));
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let app = TestApp::spawn().await;
        let id = app.upload_default_scene().await;

        let res = app.start_render(&id, 10, 2).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_body_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(routes::RENDER, &json!({ "id": "not-a-uuid", "frame_start": 1, "frame_end": 1 }))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn unknown_scene_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .start_render("00000000-0000-4000-8000-000000000000", 1, 1)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
        let status = app.get(routes::RENDER_STATUS).await;
        assert_eq!(status.body["is_rendering"], false);
    }
}

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn upload_render_and_fetch_result() {
        let app = TestApp::spawn().await;
        let id = app.upload_default_scene().await;

        let res = app.start_render(&id, 1, 1).await;
        assert_eq!(res.status, 202, "{}", res.text);
        assert!(!res.text.is_empty());

        app.wait_until_idle().await;

        let res = app.fetch_result(&id).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "application/zip");
        assert_eq!(
            res.headers()["content-disposition"],
            format!("attachment; filename=\"{id}.zip\"").as_str()
        );
        let bytes = res.bytes().await.unwrap();
        assert!(!bytes.is_empty());

        let mut zip = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
        let mut frame = String::new();
        zip.by_name("frame_1.png")
            .unwrap()
            .read_to_string(&mut frame)
            .unwrap();
        assert_eq!(frame, "frame 1");

        assert!(!app.data.workspace_directory.join(&id).exists());
    }

    #[tokio::test]
    async fn result_is_not_found_before_rendering() {
        let app = TestApp::spawn().await;
        let id = app.upload_default_scene().await;

        let res = app.fetch_result(&id).await;

        assert_eq!(res.status(), 404);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn failed_render_returns_to_idle_without_result() {
        let app = TestApp::spawn_with_env(&[("EXIT_CODE", "1".into())]).await;
        let id = app.upload_default_scene().await;

        let res = app.start_render(&id, 1, 2).await;
        assert_eq!(res.status, 202);

        app.wait_until_idle().await;
        assert_eq!(app.fetch_result(&id).await.status(), 404);

        let again = app.start_render(&id, 1, 1).await;
        assert_eq!(again.status, 202);
        app.wait_until_idle().await;
    }
}

mod exclusion {
    use super::*;

    #[tokio::test]
    async fn running_render_blocks_renders_and_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let gate = dir.path().join("release");
        let app =
            TestApp::spawn_with_env(&[("GATE_FILE", gate.to_string_lossy().into_owned())]).await;
        let id = app.upload_default_scene().await;

        assert_eq!(app.start_render(&id, 3, 5).await.status, 202);

        let second = app.start_render(&id, 1, 1).await;
        assert_eq!(second.status, 503);
        assert_eq!(second.body["code"], "SERVICE_BUSY");
        assert_eq!(second.headers["retry-after"], "5");

        let archive = scene_archive();
        let upload = app
            .upload_scene("other.zip", archive.clone(), &checksum_hex(&archive))
            .await;
        assert_eq!(upload.status, 503);

        let status = app
            .wait_for_status(|body| body["progress"]["current_frame"] == 5)
            .await;
        assert_eq!(status["is_rendering"], true);
        assert_eq!(status["request"]["id"], id.as_str());
        assert_eq!(status["request"]["frame_start"], 3);
        assert_eq!(status["progress"]["frame_count"], 3);
        assert_eq!(status["progress"]["frame_percent"], 100.0);

        std::fs::write(&gate, b"").unwrap();
        app.wait_until_idle().await;

        assert_eq!(app.fetch_result(&id).await.status(), 200);
        assert_eq!(app.start_render(&id, 1, 1).await.status, 202);
        app.wait_until_idle().await;
    }
}
