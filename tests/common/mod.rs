use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const FIXTURE_INVENTORY: &str = r#"
groups:
  - name: pg-main
    datacenter: dc1
    children: [pg-replicas]
    hosts:
      - pgmainbr01.prod.example.com
      - pgmainbr02.prod.example.com
    vars:
      postgres_port: 5432
      tuning:
        shared_buffers: 4GB
  - name: pg-replicas
    datacenter: dc1
    hosts: [pgmainbr03.prod.example.com]
  - name: web
    datacenter: dc2
    hosts: [webbr11.dr.example.com]
  - name: web
    datacenter: dc2
    hosts: [webbr12.dr.example.com]
  - name: empty
    datacenter: dc3
hosts:
  - name: pgmainbr01.prod.example.com
    vars: {role: leader, weight: 10}
  - name: pgmainbr02.prod.example.com
    vars: {role: replica, weight: 5}
  - name: pgmainbr03.prod.example.com
    vars: {role: replica, tags: [async, dr]}
  - name: webbr11.dr.example.com
    vars: {}
"#;

pub struct TestEnv {
    tmp: TempDir,
    pub inventory: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_inventory(FIXTURE_INVENTORY)
    }

    pub fn with_inventory(content: &str) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let inventory = tmp.path().join("inventory.adi.yml");
        fs::write(&inventory, content).expect("write inventory");
        Self { tmp, inventory }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    /// Runs from the temp dir so no local settings file is picked up.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("adi").expect("adi binary");
        cmd.current_dir(self.tmp.path())
            .env_remove("RUST_LOG")
            .env_remove("ADI_DB_PASSWORD");
        cmd
    }

    pub fn file_cmd(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--inventory-file")
            .arg(self.inventory.to_str().expect("inventory path utf8"));
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let out = self
            .file_cmd()
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}
