use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Client descriptor sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub l: String,
    pub v: String,
}

/// Everything that identifies one deployment of the journey planner.
///
/// Defaults target the Leipzig/INSA planner. A profile can be loaded from a
/// JSON file; omitted keys keep their default:
/// ```json
/// {
///   "endpoint": "https://reiseauskunft.insa.de/bin/mgate.exe",
///   "aid": "kAL6ULet"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HafasProfile {
    pub endpoint: String,
    pub origin: String,
    pub referer: String,
    pub id: String,
    pub ver: String,
    pub lang: String,
    pub aid: String,
    pub client: ClientInfo,
}

impl Default for HafasProfile {
    fn default() -> Self {
        Self {
            endpoint: "https://reiseauskunft.insa.de/bin/mgate.exe".to_string(),
            origin: "https://reiseauskunft.insa.de".to_string(),
            referer: "https://reiseauskunft.insa.de/lvb/index.html?language=de_DE&P=SQ"
                .to_string(),
            id: "dkw29zk6w2gqh64s".to_string(),
            ver: "1.48".to_string(),
            lang: "deu".to_string(),
            aid: "kAL6ULet".to_string(),
            client: ClientInfo {
                id: "NASA".to_string(),
                kind: "WEB".to_string(),
                name: "webapp".to_string(),
                l: "vs_webapp_lvb".to_string(),
                v: String::new(),
            },
        }
    }
}

impl HafasProfile {
    /// Loads a profile from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile '{path}'"))?;
        serde_json::from_str(&content).with_context(|| format!("invalid profile '{path}'"))
    }

    /// Loads `path` if given, otherwise returns the default profile.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}
