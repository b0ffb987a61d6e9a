use std::fs;

use rollkit_core::config::{Workspace, WorkspaceConfig};
use rollkit_core::error::Error;
use rollkit_core::scaffold::Scaffold;
use tempfile::TempDir;

fn create_workspace(scope: Option<&str>) -> (TempDir, Workspace) {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("package.json"),
        r#"{
  "private": true,
  "version": "3.2.1",
  "homepage": "https://github.com/vuejs/vue-next#readme",
  "author": { "name": "Evan You" }
}"#,
    )
    .unwrap();
    let config = WorkspaceConfig {
        name: scope.map(str::to_string),
        ..WorkspaceConfig::default()
    };
    let workspace = Workspace::load(temp_dir.path(), config).unwrap();
    (temp_dir, workspace)
}

#[test]
fn test_full_name_uses_scope() {
    let (_temp_dir, workspace) = create_workspace(Some("vue"));
    let mut scaffold = Scaffold::new("reactivity");
    assert_eq!(scaffold.full_name(&workspace), "@vue/reactivity");

    scaffold.scope = Some("acme".to_string());
    assert_eq!(scaffold.full_name(&workspace), "@acme/reactivity");

    let (_temp_dir, unscoped) = create_workspace(None);
    assert_eq!(Scaffold::new("reactivity").full_name(&unscoped), "reactivity");
}

#[test]
fn test_render_package_json() {
    let (_temp_dir, workspace) = create_workspace(Some("vue"));
    let files = Scaffold::new("reactivity").render(&workspace).unwrap();

    let names: Vec<&str> = files.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["README.md", "package.json", "index.js", "api-extractor.json"]);
    assert_eq!(files[0].1, "# @vue/reactivity");

    let manifest: serde_json::Value = serde_json::from_str(&files[1].1).unwrap();
    assert_eq!(manifest["name"], "@vue/reactivity");
    assert_eq!(manifest["version"], "3.2.1");
    assert_eq!(manifest["module"], "dist/reactivity.esm.js");
    assert_eq!(manifest["types"], "dist/reactivity.d.ts");
    assert_eq!(manifest["author"], "Evan You");
    assert_eq!(manifest["license"], "MIT");
    assert_eq!(
        manifest["repository"]["url"],
        "git+https://github.com/vuejs/vue-next.git"
    );
    assert_eq!(
        manifest["homepage"],
        "https://github.com/vuejs/vue-next/tree/master/packages/reactivity#readme"
    );

    let keys: Vec<&String> = manifest.as_object().unwrap().keys().collect();
    assert_eq!(keys[0], "name");
    assert_eq!(keys[1], "version");
    assert_eq!(keys.last().copied().map(String::as_str), Some("files"));

    assert!(files[2].1.contains("require('./dist/reactivity.cjs.prod.js')"));
    assert!(files[3].1.contains("./dist/packages/reactivity/src/index.d.ts"));
}

#[test]
fn test_explicit_fields_override_workspace() {
    let (_temp_dir, workspace) = create_workspace(Some("vue"));
    let scaffold = Scaffold {
        url: Some("https://example.com/repo".to_string()),
        author: Some("Jane".to_string()),
        license: "Apache-2.0".to_string(),
        ..Scaffold::new("router")
    };
    let files = scaffold.render(&workspace).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&files[1].1).unwrap();

    assert_eq!(manifest["author"], "Jane");
    assert_eq!(manifest["license"], "Apache-2.0");
    assert_eq!(manifest["bugs"]["url"], "https://example.com/repo/issues");
}

#[test]
fn test_create_writes_files() {
    let (_temp_dir, workspace) = create_workspace(Some("vue"));
    let dir = Scaffold::new("reactivity").create(&workspace).unwrap();

    assert_eq!(dir, workspace.package_dir("reactivity"));
    for file in ["README.md", "package.json", "index.js", "api-extractor.json"] {
        assert!(dir.join(file).is_file(), "missing {}", file);
    }
}

#[test]
fn test_create_refuses_existing_directory() {
    let (_temp_dir, workspace) = create_workspace(Some("vue"));
    fs::create_dir_all(workspace.package_dir("shared")).unwrap();

    let result = Scaffold::new("shared").create(&workspace);
    assert!(matches!(result, Err(Error::PackageExists(_))));
}
