use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rollkit_core::adapter::{PackageManager, PublishOutcome, Registry, VersionControl};
use rollkit_core::config::{Workspace, WorkspaceConfig};
use rollkit_core::error::{Error, Result};
use rollkit_core::package::Package;
use rollkit_core::release::{
    is_internal_dependency, parse_version, pre_identifier, release_tag, update_manifest,
    ReleaseEngine, ReleaseOptions, ReleaseTools, VersionIncrement,
};
use rollkit_core::reporter::SilentReporter;
use semver::Version;
use tempfile::TempDir;

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

fn bump(increment: VersionIncrement, current: &str, pre: Option<&str>) -> String {
    increment.apply(&v(current), pre).unwrap().to_string()
}

#[test]
fn test_plain_increments() {
    assert_eq!(bump(VersionIncrement::Patch, "1.2.3", None), "1.2.4");
    assert_eq!(bump(VersionIncrement::Minor, "1.2.3", None), "1.3.0");
    assert_eq!(bump(VersionIncrement::Major, "1.2.3", None), "2.0.0");
}

#[test]
fn test_plain_increments_from_prerelease() {
    assert_eq!(bump(VersionIncrement::Patch, "1.2.3-beta.1", None), "1.2.3");
    assert_eq!(bump(VersionIncrement::Minor, "1.3.0-beta.2", None), "1.3.0");
    assert_eq!(bump(VersionIncrement::Minor, "1.3.1-beta.2", None), "1.4.0");
    assert_eq!(bump(VersionIncrement::Major, "2.0.0-rc.0", None), "2.0.0");
    assert_eq!(bump(VersionIncrement::Major, "2.1.0-rc.0", None), "3.0.0");
}

#[test]
fn test_pre_increments() {
    assert_eq!(bump(VersionIncrement::Prepatch, "1.2.3", Some("alpha")), "1.2.4-alpha.0");
    assert_eq!(bump(VersionIncrement::Preminor, "1.2.3", Some("beta")), "1.3.0-beta.0");
    assert_eq!(bump(VersionIncrement::Premajor, "1.2.3", Some("rc")), "2.0.0-rc.0");
    assert_eq!(bump(VersionIncrement::Premajor, "1.2.3", None), "2.0.0-0");
}

#[test]
fn test_prerelease_increments() {
    assert_eq!(bump(VersionIncrement::Prerelease, "1.2.3", Some("alpha")), "1.2.4-alpha.0");
    assert_eq!(bump(VersionIncrement::Prerelease, "3.0.0-beta.4", Some("beta")), "3.0.0-beta.5");
    assert_eq!(bump(VersionIncrement::Prerelease, "3.0.0-beta.4", Some("rc")), "3.0.0-rc.0");
    assert_eq!(bump(VersionIncrement::Prerelease, "3.0.0-beta.4", None), "3.0.0-beta.5");
    assert_eq!(bump(VersionIncrement::Prerelease, "1.0.0-alpha", None), "1.0.0-alpha.0");
}

#[test]
fn test_available_increments() {
    assert_eq!(VersionIncrement::available(None).len(), 3);
    let with_pre = VersionIncrement::available(Some("beta"));
    assert_eq!(with_pre.len(), 7);
    assert_eq!(with_pre.last(), Some(&VersionIncrement::Prerelease));
    assert_eq!("preminor".parse::<VersionIncrement>().unwrap(), VersionIncrement::Preminor);
    assert!("huge".parse::<VersionIncrement>().is_err());
}

#[test]
fn test_parse_version() {
    assert_eq!(parse_version("v3.0.0").unwrap(), v("3.0.0"));
    assert_eq!(parse_version(" 1.2.3-rc.1 ").unwrap(), v("1.2.3-rc.1"));
    assert!(matches!(parse_version("latest"), Err(Error::InvalidVersion(_))));
}

#[test]
fn test_pre_identifier() {
    assert_eq!(pre_identifier(&v("3.0.0-beta.3"), None).as_deref(), Some("beta"));
    assert_eq!(pre_identifier(&v("3.0.0-beta.3"), Some("rc")).as_deref(), Some("rc"));
    assert_eq!(pre_identifier(&v("3.0.0"), None), None);
}

#[test]
fn test_release_tag() {
    assert_eq!(release_tag(None, "3.0.0-alpha.1").as_deref(), Some("alpha"));
    assert_eq!(release_tag(None, "3.0.0-beta.1").as_deref(), Some("beta"));
    assert_eq!(release_tag(None, "3.0.0-rc.1").as_deref(), Some("rc"));
    assert_eq!(release_tag(None, "3.0.0"), None);
    assert_eq!(release_tag(Some("next"), "3.0.0-rc.1").as_deref(), Some("next"));
}

#[test]
fn test_internal_dependency() {
    let packages = vec!["shared".to_string(), "runtime-core".to_string()];
    assert!(is_internal_dependency("vue", Some("vue"), &packages));
    assert!(is_internal_dependency("@vue/shared", Some("vue"), &packages));
    assert!(!is_internal_dependency("@vue/devtools", Some("vue"), &packages));
    assert!(!is_internal_dependency("@other/shared", Some("vue"), &packages));
    assert!(!is_internal_dependency("@vue/shared", None, &packages));
}

#[test]
fn test_update_manifest_preserves_key_order() {
    let temp_dir = TempDir::new().unwrap();
    let original = r#"{
  "name": "@vue/runtime-dom",
  "version": "3.0.0",
  "main": "index.js",
  "dependencies": {
    "@vue/shared": "3.0.0",
    "csstype": "^2.6.8",
    "@vue/runtime-core": "3.0.0"
  },
  "peerDependencies": {
    "vue": "3.0.0"
  },
  "devDependencies": {
    "@vue/shared": "3.0.0"
  }
}
"#;
    fs::write(temp_dir.path().join("package.json"), original).unwrap();

    let packages = vec!["shared".to_string(), "runtime-core".to_string()];
    update_manifest(temp_dir.path(), "3.1.0", Some("vue"), &packages, &SilentReporter).unwrap();

    let expected = r#"{
  "name": "@vue/runtime-dom",
  "version": "3.1.0",
  "main": "index.js",
  "dependencies": {
    "@vue/shared": "3.1.0",
    "csstype": "^2.6.8",
    "@vue/runtime-core": "3.1.0"
  },
  "peerDependencies": {
    "vue": "3.1.0"
  },
  "devDependencies": {
    "@vue/shared": "3.0.0"
  }
}
"#;
    assert_eq!(fs::read_to_string(temp_dir.path().join("package.json")).unwrap(), expected);
}

type Log = Arc<Mutex<Vec<String>>>;

struct FakeVcs {
    log: Log,
    dirty: bool,
}

#[async_trait]
impl VersionControl for FakeVcs {
    fn short_commit(&self, _root: &Path) -> Result<String> {
        Ok("abc1234".to_string())
    }
    fn has_changes(&self, _root: &Path) -> Result<bool> {
        Ok(self.dirty)
    }
    async fn commit_all(&self, _root: &Path, message: &str) -> Result<()> {
        self.log.lock().unwrap().push(format!("commit {}", message));
        Ok(())
    }
    async fn tag(&self, _root: &Path, tag: &str) -> Result<()> {
        self.log.lock().unwrap().push(format!("tag {}", tag));
        Ok(())
    }
    async fn push_tag(&self, _root: &Path, tag: &str) -> Result<()> {
        self.log.lock().unwrap().push(format!("push-tag {}", tag));
        Ok(())
    }
    async fn push(&self, _root: &Path) -> Result<()> {
        self.log.lock().unwrap().push("push".to_string());
        Ok(())
    }
}

struct FakeRegistry {
    log: Log,
    already: Vec<String>,
    failing: Option<String>,
}

#[async_trait]
impl Registry for FakeRegistry {
    async fn publish(
        &self,
        package: &Package,
        version: &str,
        tag: Option<&str>,
        access: &str,
    ) -> Result<PublishOutcome> {
        if self.failing.as_deref() == Some(package.name.as_str()) {
            return Err(Error::ToolFailed {
                tool: "npm".to_string(),
                package: package.name.clone(),
                code: Some(1),
                stderr: "E403 forbidden".to_string(),
            });
        }
        self.log.lock().unwrap().push(format!(
            "publish {}@{} tag={} access={}",
            package.name,
            version,
            tag.unwrap_or("-"),
            access
        ));
        if self.already.contains(&package.name) {
            Ok(PublishOutcome::AlreadyPublished)
        } else {
            Ok(PublishOutcome::Published)
        }
    }
}

struct FakePackageManager {
    log: Log,
}

#[async_trait]
impl PackageManager for FakePackageManager {
    async fn changelog(&self, _root: &Path) -> Result<()> {
        self.log.lock().unwrap().push("changelog".to_string());
        Ok(())
    }
    async fn install(&self, _root: &Path) -> Result<()> {
        self.log.lock().unwrap().push("install".to_string());
        Ok(())
    }
}

fn create_workspace() -> (TempDir, Workspace) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(
        root.join("package.json"),
        "{\n  \"private\": true,\n  \"version\": \"3.0.0\"\n}\n",
    )
    .unwrap();

    let packages = [
        ("shared", r#"{ "name": "@vue/shared", "version": "3.0.0" }"#),
        (
            "runtime-core",
            r#"{ "name": "@vue/runtime-core", "version": "3.0.0", "dependencies": { "@vue/shared": "3.0.0" } }"#,
        ),
        ("playground", r#"{ "name": "playground", "version": "3.0.0", "private": true }"#),
    ];
    for (name, manifest) in packages {
        let dir = root.join("packages").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("package.json"), manifest).unwrap();
    }

    let config = WorkspaceConfig {
        name: Some("vue".to_string()),
        ..WorkspaceConfig::default()
    };
    let workspace = Workspace::load(root, config).unwrap();
    (temp_dir, workspace)
}

fn engine(workspace: &Workspace, log: &Log, registry: FakeRegistry, tag: Option<&str>) -> ReleaseEngine {
    let tools = ReleaseTools {
        vcs: Box::new(FakeVcs {
            log: Arc::clone(log),
            dirty: true,
        }),
        registry: Box::new(registry),
        package_manager: Box::new(FakePackageManager {
            log: Arc::clone(log),
        }),
    };
    let options = ReleaseOptions {
        skip_build: true,
        tag: tag.map(str::to_string),
    };
    ReleaseEngine::new(workspace.clone(), tools, None, options, Arc::new(SilentReporter)).unwrap()
}

fn manifest_version(path: &Path) -> String {
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path.join("package.json")).unwrap()).unwrap();
    json["version"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_release_runs_steps_in_order() {
    let (_temp_dir, workspace) = create_workspace();
    let log: Log = Arc::default();
    let registry = FakeRegistry {
        log: Arc::clone(&log),
        already: vec!["shared".to_string()],
        failing: None,
    };

    let summary = engine(&workspace, &log, registry, None)
        .execute(&v("3.1.0-beta.0"))
        .await
        .unwrap();

    assert_eq!(summary.version, "3.1.0-beta.0");
    assert_eq!(summary.published, vec!["runtime-core"]);
    assert_eq!(summary.already_published, vec!["shared"]);
    assert_eq!(summary.skipped_private, vec!["playground"]);

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "changelog",
            "install",
            "commit release: v3.1.0-beta.0",
            "publish runtime-core@3.1.0-beta.0 tag=beta access=public",
            "publish shared@3.1.0-beta.0 tag=beta access=public",
            "tag v3.1.0-beta.0",
            "push-tag v3.1.0-beta.0",
            "push",
        ]
    );

    let root = workspace.root();
    assert_eq!(manifest_version(root), "3.1.0-beta.0");
    let core = workspace.package_dir("runtime-core");
    assert_eq!(manifest_version(&core), "3.1.0-beta.0");
    let core_json = fs::read_to_string(core.join("package.json")).unwrap();
    assert!(core_json.contains(r#""@vue/shared": "3.1.0-beta.0""#));
}

#[tokio::test]
async fn test_release_failure_restores_versions() {
    let (_temp_dir, workspace) = create_workspace();
    let log: Log = Arc::default();
    let registry = FakeRegistry {
        log: Arc::clone(&log),
        already: Vec::new(),
        failing: Some("shared".to_string()),
    };

    let result = engine(&workspace, &log, registry, Some("next"))
        .execute(&v("3.1.0"))
        .await;

    assert!(matches!(result, Err(Error::ToolFailed { .. })));
    assert_eq!(manifest_version(workspace.root()), "3.0.0");
    for name in ["shared", "runtime-core", "playground"] {
        assert_eq!(manifest_version(&workspace.package_dir(name)), "3.0.0");
    }
    let log = log.lock().unwrap();
    assert!(log.contains(&"publish runtime-core@3.1.0 tag=next access=public".to_string()));
    assert!(!log.iter().any(|entry| entry.starts_with("tag ")));
}

#[tokio::test]
async fn test_clean_tree_skips_commit() {
    let (_temp_dir, workspace) = create_workspace();
    let log: Log = Arc::default();
    let tools = ReleaseTools {
        vcs: Box::new(FakeVcs {
            log: Arc::clone(&log),
            dirty: false,
        }),
        registry: Box::new(FakeRegistry {
            log: Arc::clone(&log),
            already: Vec::new(),
            failing: None,
        }),
        package_manager: Box::new(FakePackageManager {
            log: Arc::clone(&log),
        }),
    };
    let engine = ReleaseEngine::new(
        workspace.clone(),
        tools,
        None,
        ReleaseOptions::default(),
        Arc::new(SilentReporter),
    )
    .unwrap();

    assert_eq!(engine.packages().len(), 3);
    engine.execute(&v("3.0.1")).await.unwrap();

    assert!(!log.lock().unwrap().iter().any(|e| e.starts_with("commit")));
}
