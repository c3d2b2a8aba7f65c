use crate::scenario::ScenarioInput;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Serialization format of a scenario file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    Json,
    Yaml,
}

impl ScenarioFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// A scenario file found in the input directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioFile {
    /// Numeric identifier taken from the file stem
    pub id: u64,
    pub path: PathBuf,
}

/// Load and parse a scenario from a JSON or YAML file
pub fn load_scenario(path: &Path) -> Result<ScenarioInput> {
    debug!("Loading scenario from: {:?}", path);

    let format = ScenarioFormat::from_path(path)
        .ok_or_else(|| eyre!("Unsupported scenario file extension: {}", path.display()))?;

    let file = File::open(path)
        .wrap_err_with(|| format!("Failed to open scenario file '{}'", path.display()))?;

    let input: ScenarioInput = match format {
        ScenarioFormat::Json => serde_json::from_reader(file)
            .wrap_err_with(|| format!("Failed to parse JSON scenario '{}'", path.display()))?,
        ScenarioFormat::Yaml => serde_yaml::from_reader(file)
            .wrap_err_with(|| format!("Failed to parse YAML scenario '{}'", path.display()))?,
    };

    debug!(
        "Scenario {:?}: {} routers, {} subnets, {} links, {} communications",
        path.file_name().unwrap_or_default(),
        input.network.routers.len(),
        input.network.subnets.len(),
        input.network.links.len(),
        input.communications.len()
    );

    Ok(input)
}

/// Scenario id from a file name like `17.json`
pub fn scenario_id_from_path(path: &Path) -> Option<u64> {
    path.file_stem()?.to_str()?.parse().ok()
}

/// Find every scenario file under `input_dir`, recursively.
///
/// Files with an unsupported extension or a non-numeric stem are skipped.
/// When two files share an id, the first in path order wins and the other
/// is skipped with a warning, since both would write the same output
/// directory. Results are ordered by id.
pub fn discover_scenarios(input_dir: &Path) -> Result<Vec<ScenarioFile>> {
    if !input_dir.is_dir() {
        return Err(eyre!("Input path '{}' is not a directory", input_dir.display()));
    }

    let mut paths = Vec::new();
    collect_files(input_dir, &mut paths)?;
    paths.sort();

    let mut by_id: BTreeMap<u64, PathBuf> = BTreeMap::new();
    for path in paths {
        if ScenarioFormat::from_path(&path).is_none() {
            debug!("Skipping non-scenario file {:?}", path);
            continue;
        }
        let Some(id) = scenario_id_from_path(&path) else {
            warn!("Skipping {:?}: file name is not a numeric scenario id", path);
            continue;
        };
        if let Some(existing) = by_id.get(&id) {
            warn!("Skipping {:?}: scenario id {} already provided by {:?}", path, id, existing);
            continue;
        }
        by_id.insert(id, path);
    }

    info!("Found {} scenario files in {:?}", by_id.len(), input_dir);

    Ok(by_id
        .into_iter()
        .map(|(id, path)| ScenarioFile { id, path })
        .collect())
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir)
        .wrap_err_with(|| format!("Failed to read directory '{}'", dir.display()))?;

    for entry in entries {
        let entry = entry.wrap_err_with(|| format!("Failed to read entry in '{}'", dir.display()))?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Direction, Protocol};
    use tempfile::TempDir;

    const JSON: &str = r#"{
        "network": {
            "routers": [{"id": 0}],
            "subnets": [{"id": 0, "address": "10.0.0.0", "prefix": 24}],
            "links": [{"routerId": 0, "interfaceId": "eth0", "ip": "10.0.0.1", "subnetId": 0}]
        },
        "communications": []
    }"#;

    const YAML: &str = r#"
network:
  routers:
    - id: 0
  subnets:
    - id: 0
      address: "10.0.0.0"
      prefix: 24
    - id: 1
      address: "10.0.1.0"
      prefix: 24
  links:
    - routerId: 0
      interfaceId: eth0
      ip: "10.0.0.1"
      subnetId: 0
    - routerId: 0
      interfaceId: eth1
      ip: "10.0.1.1"
      subnetId: 1
communications:
  - sourceSubnetId: 0
    targetSubnetId: 1
    protocol: icmp
    direction: bidirectional
"#;

    #[test]
    fn test_load_json_scenario() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("3.json");
        fs::write(&path, JSON).unwrap();

        let input = load_scenario(&path).unwrap();
        assert_eq!(input.network.links[0].interface_id, "eth0");
        assert!(input.communications.is_empty());
    }

    #[test]
    fn test_load_yaml_scenario() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("4.yml");
        fs::write(&path, YAML).unwrap();

        let input = load_scenario(&path).unwrap();
        assert_eq!(input.network.subnets.len(), 2);
        assert_eq!(input.communications[0].protocol, Protocol::Icmp);
        assert_eq!(input.communications[0].direction, Direction::Bidirectional);
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("5.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_scenario(&path).unwrap_err();
        assert!(format!("{:?}", err).contains("5.json"));

        let missing = dir.path().join("6.json");
        assert!(load_scenario(&missing).is_err());
        assert!(load_scenario(&dir.path().join("7.txt")).is_err());
    }

    #[test]
    fn test_scenario_id_from_path() {
        assert_eq!(scenario_id_from_path(Path::new("in/12.json")), Some(12));
        assert_eq!(scenario_id_from_path(Path::new("0.yaml")), Some(0));
        assert_eq!(scenario_id_from_path(Path::new("readme.json")), None);
        assert_eq!(scenario_id_from_path(Path::new("-1.json")), None);
    }

    #[test]
    fn test_discover_scenarios() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("10.json"), JSON).unwrap();
        fs::write(dir.path().join("2.json"), JSON).unwrap();
        fs::write(dir.path().join("nested/7.yaml"), YAML).unwrap();
        fs::write(dir.path().join("nested/2.json"), JSON).unwrap();
        fs::write(dir.path().join("notes.json"), JSON).unwrap();
        fs::write(dir.path().join("11.txt"), "").unwrap();

        let files = discover_scenarios(dir.path()).unwrap();
        let ids: Vec<u64> = files.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![2, 7, 10]);
        assert_eq!(files[0].path, dir.path().join("2.json"));
    }

    #[test]
    fn test_discover_requires_directory() {
        let dir = TempDir::new().unwrap();
        assert!(discover_scenarios(&dir.path().join("absent")).is_err());
    }
}
