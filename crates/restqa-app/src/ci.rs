//! Continuous-integration templates emitted by `restqa init`.

use restqa_adapters::write_yaml_document;
use restqa_error::Result;
use restqa_types::CiFlavor;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tracing::info;

const IMAGE: &str = "restqa/restqa";

pub fn ci_template(flavor: CiFlavor) -> Value {
    match flavor {
        CiFlavor::GithubAction => json!({
            "name": "RestQA - Integration tests",
            "on": ["push"],
            "jobs": {
                "RestQa": {
                    "runs-on": "ubuntu-latest",
                    "steps": [
                        { "uses": "actions/checkout@v1" },
                        {
                            "uses": "restqa/restqa-action@0.0.1",
                            "with": { "path": "tests/" }
                        },
                        {
                            "name": "RestQA Report",
                            "uses": "actions/upload-artifact@v2",
                            "with": { "name": "restqa-report", "path": "report" }
                        }
                    ]
                }
            }
        }),
        CiFlavor::GitlabCi => json!({
            "stages": ["e2e test"],
            "RestQa": {
                "stage": "e2e test",
                "image": { "name": IMAGE },
                "script": ["restqa run ."],
                "artifacts": { "paths": ["report"] }
            }
        }),
        CiFlavor::BitbucketPipeline => json!({
            "pipelines": {
                "default": [{
                    "step": {
                        "image": IMAGE,
                        "script": ["restqa run ."],
                        "artifacts": ["report/**"]
                    }
                }]
            }
        }),
        CiFlavor::CircleCi => json!({
            "version": 2.1,
            "jobs": {
                "test": {
                    "docker": [{ "image": IMAGE }],
                    "steps": [
                        "checkout",
                        {
                            "run": {
                                "name": "Run RestQA integration test",
                                "command": "restqa run"
                            }
                        },
                        { "store_artifacts": { "path": "report" } }
                    ]
                }
            },
            "workflows": {
                "version": 2,
                "restqa": { "jobs": ["test"] }
            }
        }),
        CiFlavor::Travis => json!({
            "dist": "trusty",
            "jobs": {
                "include": [{
                    "stage": "test",
                    "script": format!("docker run --rm -v $PWD:/app {IMAGE}")
                }]
            }
        }),
    }
}

/// Render `flavor` under `folder`, creating intermediate directories.
pub fn write_ci_template(folder: &Path, flavor: CiFlavor) -> Result<PathBuf> {
    let path = folder.join(flavor.path());
    write_yaml_document(&path, &ci_template(flavor))?;
    info!(ci = flavor.display_name(), path = %path.display(), "continuous integration configured");
    Ok(path)
}
