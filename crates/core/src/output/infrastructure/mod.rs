pub mod directory_artifact_store;
