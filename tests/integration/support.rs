//! Scripted in-memory workspace for driving the tool layer without a JVM.

use netlogo_mcp::engine::{EngineFailure, EngineValue, Normalizer, Workspace};
use netlogo_mcp::models::ModelStore;
use netlogo_mcp::session::Session;
use netlogo_mcp::tools::NetLogoTools;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake-view";

const COMPILER: &str = "org.nlogo.core.CompilerException: ";
const RUNTIME: &str = "org.nlogo.nvm.RuntimePrimitiveException: ";
const LOGO: &str = "org.nlogo.api.LogoException: ";

/// Everything the fake engine saw and its current world.
#[derive(Debug)]
pub struct FakeState {
    pub loaded: Option<PathBuf>,
    pub opens: Vec<PathBuf>,
    pub commands: Vec<String>,
    pub reports: Vec<String>,
    pub ticks: i64,
    pub ticks_started: bool,
    /// min-pxcor, max-pxcor, min-pycor, max-pycor
    pub extent: (i64, i64, i64, i64),
    pub disposals: usize,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            loaded: None,
            opens: Vec::new(),
            commands: Vec::new(),
            reports: Vec::new(),
            ticks: 0,
            ticks_started: true,
            extent: (-3, 3, -2, 2),
            disposals: 0,
        }
    }
}

impl FakeState {
    /// Commands and reporters sent, including loaded-model checks.
    pub fn engine_calls(&self) -> usize {
        self.commands.len() + self.reports.len()
    }
}

pub struct FakeWorkspace {
    state: Arc<Mutex<FakeState>>,
}

fn failure(prefix: &str, message: &str) -> EngineFailure {
    EngineFailure::new(format!("{}{}", prefix, message))
}

fn quoted_path(source: &str, primitive: &str) -> Option<PathBuf> {
    let rest = source.strip_prefix(primitive)?.trim();
    let inner = rest.strip_prefix('"')?.strip_suffix('"')?;
    Some(PathBuf::from(inner))
}

impl Workspace for FakeWorkspace {
    fn open(&mut self, path: &Path) -> Result<(), EngineFailure> {
        let mut state = self.state.lock();
        state.opens.push(path.to_path_buf());
        let source = std::fs::read_to_string(path)
            .map_err(|e| failure(LOGO, &format!("cannot read model: {}", e)))?;
        if source.contains("BROKEN") {
            return Err(failure(
                COMPILER,
                &format!("{}Expected a closing bracket.", COMPILER),
            ));
        }
        state.loaded = Some(path.to_path_buf());
        state.ticks = 0;
        state.ticks_started = !source.contains("NO-RESET");
        Ok(())
    }

    fn command(&mut self, source: &str) -> Result<(), EngineFailure> {
        let mut state = self.state.lock();
        state.commands.push(source.to_string());
        if state.loaded.is_none() {
            return Err(failure(LOGO, "no model loaded"));
        }
        match source {
            "setup" => {
                state.ticks = 0;
                state.ticks_started = true;
            }
            "go" | "tick" => state.ticks += 1,
            _ if source.starts_with("set ") => {
                if source.starts_with("set missing-var") {
                    return Err(failure(COMPILER, "Nothing named MISSING-VAR has been defined."));
                }
            }
            _ if source.starts_with("export-view") => {
                let path = quoted_path(source, "export-view")
                    .ok_or_else(|| failure(COMPILER, "export-view expected a string"))?;
                std::fs::write(path, PNG_BYTES).map_err(|e| failure(RUNTIME, &e.to_string()))?;
            }
            _ if source.starts_with("export-world") => {
                let path = quoted_path(source, "export-world")
                    .ok_or_else(|| failure(COMPILER, "export-world expected a string"))?;
                std::fs::write(path, "\"RANDOM STATE\"\n\"GLOBALS\"\n")
                    .map_err(|e| failure(RUNTIME, &e.to_string()))?;
            }
            other => {
                return Err(failure(
                    COMPILER,
                    &format!("Nothing named {} has been defined.", other.to_uppercase()),
                ))
            }
        }
        Ok(())
    }

    fn report(&mut self, source: &str) -> Result<EngineValue, EngineFailure> {
        let mut state = self.state.lock();
        state.reports.push(source.to_string());
        if state.loaded.is_none() {
            return Err(failure(LOGO, "no model loaded"));
        }
        let (min_px, max_px, min_py, max_py) = state.extent;
        let value = match source {
            "max-pxcor" => EngineValue::Float(max_px as f64),
            "min-pxcor" => EngineValue::Float(min_px as f64),
            "max-pycor" => EngineValue::Float(max_py as f64),
            "min-pycor" => EngineValue::Float(min_py as f64),
            "ticks" => {
                if !state.ticks_started {
                    return Err(failure(
                        RUNTIME,
                        "The tick counter has not been started yet. Use RESET-TICKS.",
                    ));
                }
                EngineValue::Float(state.ticks as f64)
            }
            "count turtles" => EngineValue::Integer(state.ticks),
            "count patches" => {
                EngineValue::Integer((max_px - min_px + 1) * (max_py - min_py + 1))
            }
            "count links" => EngineValue::Integer(0),
            "unstable" => {
                if state.ticks >= 3 {
                    return Err(failure(RUNTIME, "Division by zero."));
                }
                EngineValue::Integer(state.ticks)
            }
            "sample-list" => EngineValue::List(vec![
                EngineValue::Integer(1),
                EngineValue::Float(2.5),
                EngineValue::Boolean(true),
                EngineValue::Text("x".to_string()),
                EngineValue::Nothing,
            ]),
            "one-of turtles" => EngineValue::Foreign {
                type_name: "org.nlogo.agent.Turtle".to_string(),
                repr: "(turtle 0)".to_string(),
            },
            "(list min-pxcor max-pxcor min-pycor max-pycor)" => EngineValue::List(vec![
                EngineValue::Float(min_px as f64),
                EngineValue::Float(max_px as f64),
                EngineValue::Float(min_py as f64),
                EngineValue::Float(max_py as f64),
            ]),
            _ if source.starts_with("map [p -> [") => {
                let attribute = source
                    .trim_start_matches("map [p -> [")
                    .split(']')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                let mut values = Vec::new();
                // `sort patches` order: top row first, left to right.
                for y in (min_py..=max_py).rev() {
                    for x in min_px..=max_px {
                        let value = match attribute.as_str() {
                            "pxcor" => EngineValue::Float(x as f64),
                            "pycor" => EngineValue::Float(y as f64),
                            "coord" | "short" => EngineValue::Text(format!("{},{}", x, y)),
                            other => {
                                return Err(failure(
                                    COMPILER,
                                    &format!("Nothing named {} has been defined.", other.to_uppercase()),
                                ))
                            }
                        };
                        values.push(value);
                    }
                }
                if attribute == "short" {
                    values.pop();
                }
                EngineValue::List(values)
            }
            other => {
                return Err(failure(
                    COMPILER,
                    &format!("Nothing named {} has been defined.", other.to_uppercase()),
                ))
            }
        };
        Ok(value)
    }

    fn dispose(&mut self) -> Result<(), EngineFailure> {
        self.state.lock().disposals += 1;
        Ok(())
    }
}

/// Tools over a fake workspace and a temporary models directory.
pub struct Harness {
    pub tools: NetLogoTools,
    pub state: Arc<Mutex<FakeState>>,
    _temp: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_normalizer(Normalizer::standard())
    }

    pub fn with_normalizer(normalizer: Normalizer) -> Self {
        let temp = TempDir::new().unwrap();
        let state = Arc::new(Mutex::new(FakeState::default()));
        let workspace = FakeWorkspace {
            state: Arc::clone(&state),
        };
        let session = Arc::new(Session::new(Box::new(workspace)));
        let store = ModelStore::open(&temp.path().join("models")).unwrap();
        let tools = NetLogoTools::new(session, store).with_normalizer(normalizer);
        Self {
            tools,
            state,
            _temp: temp,
        }
    }

    pub fn models_dir(&self) -> &Path {
        self.tools.store().root()
    }

    /// Write a model file into the models directory.
    pub fn add_model(&self, file_name: &str, source: &str) -> PathBuf {
        let path = self.models_dir().join(file_name);
        std::fs::write(&path, source).unwrap();
        path
    }

    /// Add and open a small counter model.
    pub fn load_counter_model(&self) {
        self.add_model(
            "counter.nlogo",
            "globals [flag label]\nto setup\n  clear-all\n  reset-ticks\nend\nto go\n  tick\nend",
        );
        self.tools.open_model("counter").unwrap();
    }

    /// Set the world bounds reported by the fake engine.
    pub fn set_extent(&self, min_pxcor: i64, max_pxcor: i64, min_pycor: i64, max_pycor: i64) {
        self.state.lock().extent = (min_pxcor, max_pxcor, min_pycor, max_pycor);
    }

    pub fn last_command(&self) -> Option<String> {
        self.state.lock().commands.last().cloned()
    }
}
