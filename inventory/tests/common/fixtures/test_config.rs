//! Test configuration builder for writing config files programmatically

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for inventory config files in a temp directory
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    database_url: String,
    max_connections: Option<u32>,
    dcae_controller_required: bool,
    databus_controller_required: bool,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let database_url = format!(
            "sqlite:{}",
            temp_dir.path().join("inventory.db").display()
        );
        Self {
            temp_dir,
            database_url,
            max_connections: None,
            dcae_controller_required: false,
            databus_controller_required: false,
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    pub fn with_dcae_controller_required(mut self, required: bool) -> Self {
        self.dcae_controller_required = required;
        self
    }

    pub fn with_databus_controller_required(mut self, required: bool) -> Self {
        self.databus_controller_required = required;
        self
    }

    pub fn to_toml(&self) -> String {
        let mut toml = format!("[database]\nurl = \"{}\"\n", self.database_url);
        if let Some(max) = self.max_connections {
            toml.push_str(&format!("max_connections = {}\n", max));
        }
        toml.push_str(&format!(
            "\n[dcae_controller_connection]\nrequired = {}\nhost = \"controller.test\"\nport = 9998\nbase_path = \"/resources\"\nuser = \"dcae\"\npassword = \"secret\"\n",
            self.dcae_controller_required
        ));
        toml.push_str(&format!(
            "\n[databus_controller_connection]\nrequired = {}\nhost = \"databus.test\"\nport = 8443\nmech_id = \"mech\"\npassword = \"secret\"\n",
            self.databus_controller_required
        ));
        toml.push_str("\n[http_client]\ntimeout_seconds = 15\n");
        toml
    }

    /// Write the config file and return its location
    pub fn build(self) -> TestConfig {
        let path = self.temp_dir.path().join("inventory.toml");
        fs::write(&path, self.to_toml()).expect("Failed to write inventory.toml");
        TestConfig {
            _temp_dir: self.temp_dir,
            path,
        }
    }
}

pub struct TestConfig {
    _temp_dir: TempDir,
    pub path: PathBuf,
}
