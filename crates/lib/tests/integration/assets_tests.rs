//! Asset download as the last step of a build.

use voxgen_lib::pipeline::PipelineError;

use super::common::{TestEnv, read_tree};

#[tokio::test]
async fn assets_land_below_assets_path() {
  let mut server = mockito::Server::new_async().await;
  let _index = server
    .mock("GET", "/media/sounds/index.json")
    .with_body(r#"{ "files": ["chime.mp3"] }"#)
    .create_async()
    .await;
  let _chime = server
    .mock("GET", "/media/sounds/chime.mp3")
    .with_body("CHIME")
    .create_async()
    .await;

  let env = TestEnv::new().with_fixture("travel.json", "travel");
  let mut options = env.options("out", &["travel"], &["alexa"]);
  options.assets = Some(vec![format!("{}/media/sounds", server.url())]);

  let report = env.run(options).await.unwrap();

  assert_eq!(report.assets_downloaded, 1);
  let chime = env.out("out").join("assets/sounds/chime.mp3");
  assert_eq!(std::fs::read_to_string(chime).unwrap(), "CHIME");
}

#[tokio::test]
async fn asset_failure_comes_after_schema_files() {
  let mut server = mockito::Server::new_async().await;
  let _index = server
    .mock("GET", "/media/sounds/index.json")
    .with_status(500)
    .create_async()
    .await;

  let env = TestEnv::new().with_fixture("travel.json", "travel");
  let mut options = env.options("out", &["travel"], &["alexa"]);
  options.assets = Some(vec![format!("{}/media/sounds", server.url())]);

  let err = env.run(options).await.unwrap_err();

  assert!(matches!(err, PipelineError::Asset(_)));
  let written = read_tree(&env.out("out").join("speech-assets"));
  assert_eq!(written.len(), 4);
}
