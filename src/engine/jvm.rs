//! JVM-backed workspace
//!
//! Embeds a JVM through JNI and drives NetLogo's controlling API: a
//! `org.nlogo.headless.HeadlessWorkspace` in headless mode, or the desktop
//! `org.nlogo.app.App` singleton in GUI mode. Both expose the same
//! `open` / `command` / `report` methods.

use super::failure::EngineFailure;
use super::value::EngineValue;
use super::workspace::{EngineSettings, Workspace};
use crate::error::ApiError;
use jni::objects::{GlobalRef, JObject, JString, JValue, JValueOwned};
use jni::{InitArgsBuilder, JNIEnv, JNIVersion, JavaVM};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use walkdir::WalkDir;

const HEADLESS_CLASS: &str = "org/nlogo/headless/HeadlessWorkspace";
const APP_CLASS: &str = "org/nlogo/app/App";
const LOGO_LIST_CLASS: &str = "org/nlogo/core/LogoList";
const NOBODY_CLASS_NAME: &str = "org.nlogo.core.Nobody$";

/// Jar directories across NetLogo releases and platforms.
const JAR_DIRS: &[&str] = &["app", "Java", "lib/app"];

/// How long to wait for the desktop application to finish constructing.
const APP_STARTUP_TIMEOUT: Duration = Duration::from_secs(60);

const OPEN_WITH_FLAG_SIG: &str = "(Ljava/lang/String;Z)V";
const OPEN_SIG: &str = "(Ljava/lang/String;)V";
const COMMAND_SIG: &str = "(Ljava/lang/String;)V";
const REPORT_SIG: &str = "(Ljava/lang/String;)Ljava/lang/Object;";

pub struct JvmWorkspace {
    vm: JavaVM,
    target: GlobalRef,
    gui: bool,
}

impl JvmWorkspace {
    /// Start the JVM and create the workspace described by `settings`.
    pub fn launch(settings: &EngineSettings) -> Result<Self, ApiError> {
        let jar_dir = find_jar_dir(&settings.home)?;
        let class_path = collect_class_path(&jar_dir)?;

        let mut builder = InitArgsBuilder::new()
            .version(JNIVersion::V8)
            .option(format!("-Djava.class.path={}", class_path))
            .option(format!("-Dnetlogo.home={}", settings.home.display()));
        let extensions = jar_dir.join("extensions");
        if extensions.is_dir() {
            builder = builder.option(format!("-Dnetlogo.extensions.dir={}", extensions.display()));
        }
        if !settings.gui {
            builder = builder.option("-Djava.awt.headless=true");
        }
        let args = builder
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Invalid JVM options: {}", e)))?;

        let vm = match &settings.jvm_path {
            Some(path) => {
                let path = path.clone();
                JavaVM::with_libjvm(args, || Ok(path))
            }
            None => JavaVM::new(args),
        }
        .map_err(|e| ApiError::ConfigError(format!("Failed to start the JVM: {}", e)))?;
        info!(jar_dir = %jar_dir.display(), "JVM started");

        let target = {
            let mut env = vm
                .attach_current_thread()
                .map_err(|e| ApiError::ConfigError(format!("Failed to attach to the JVM: {}", e)))?;
            redirect_stdout(&mut env).map_err(|f| ApiError::ConfigError(f.message))?;
            let instance = if settings.gui {
                start_app(&mut env)
            } else {
                new_headless(&mut env)
            }
            .map_err(|f| ApiError::ConfigError(format!("Failed to create workspace: {}", f)))?;
            env.new_global_ref(&instance)
                .map_err(|e| ApiError::ConfigError(format!("Failed to pin workspace: {}", e)))?
        };

        Ok(Self {
            vm,
            target,
            gui: settings.gui,
        })
    }

    fn invoke<T>(
        &self,
        f: impl FnOnce(&mut JNIEnv, &GlobalRef) -> Result<T, EngineFailure>,
    ) -> Result<T, EngineFailure> {
        let mut env = self
            .vm
            .attach_current_thread()
            .map_err(|e| EngineFailure::new(format!("Failed to attach to the JVM: {}", e)))?;
        f(&mut *env, &self.target)
    }
}

impl Workspace for JvmWorkspace {
    fn open(&mut self, path: &Path) -> Result<(), EngineFailure> {
        let path = path.to_string_lossy().replace('\\', "/");
        debug!(%path, "open");
        self.invoke(|env, target| {
            let jpath = env.new_string(&path).map_err(|e| failure(env, e))?;
            let flagged = call(
                env,
                target,
                "open",
                OPEN_WITH_FLAG_SIG,
                &[(&jpath).into(), JValue::Bool(0)],
            );
            match flagged {
                Ok(_) => Ok(()),
                Err(f) if is_missing_method(&f) => {
                    call(env, target, "open", OPEN_SIG, &[(&jpath).into()]).map(|_| ())
                }
                Err(f) => Err(f),
            }
        })
    }

    fn command(&mut self, source: &str) -> Result<(), EngineFailure> {
        self.invoke(|env, target| {
            let jsource = env.new_string(source).map_err(|e| failure(env, e))?;
            call(env, target, "command", COMMAND_SIG, &[(&jsource).into()]).map(|_| ())
        })
    }

    fn report(&mut self, source: &str) -> Result<EngineValue, EngineFailure> {
        self.invoke(|env, target| {
            let jsource = env.new_string(source).map_err(|e| failure(env, e))?;
            let raw = call(env, target, "report", REPORT_SIG, &[(&jsource).into()])?
                .l()
                .map_err(|e| failure(env, e))?;
            convert(env, raw).map_err(|e| failure(env, e))
        })
    }

    fn dispose(&mut self) -> Result<(), EngineFailure> {
        if self.gui {
            // The desktop application owns its own lifecycle.
            return Ok(());
        }
        self.invoke(|env, target| call(env, target, "dispose", "()V", &[]).map(|_| ()))
    }
}

fn find_jar_dir(home: &Path) -> Result<PathBuf, ApiError> {
    JAR_DIRS
        .iter()
        .map(|dir| home.join(dir))
        .find(|dir| dir.is_dir())
        .ok_or_else(|| {
            ApiError::ConfigError(format!(
                "No NetLogo jar directory (app, Java, lib/app) found under {}",
                home.display()
            ))
        })
}

fn collect_class_path(jar_dir: &Path) -> Result<String, ApiError> {
    let mut jars: Vec<PathBuf> = WalkDir::new(jar_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().map(|ext| ext == "jar").unwrap_or(false))
        .collect();
    jars.sort();
    if jars.is_empty() {
        return Err(ApiError::ConfigError(format!(
            "No NetLogo jars found in {}",
            jar_dir.display()
        )));
    }
    let joined = std::env::join_paths(&jars)
        .map_err(|e| ApiError::ConfigError(format!("Invalid jar path: {}", e)))?;
    Ok(joined.to_string_lossy().into_owned())
}

/// Point `System.out` at `System.err`; standard output carries protocol frames.
fn redirect_stdout(env: &mut JNIEnv) -> Result<(), EngineFailure> {
    let err_stream = env
        .get_static_field("java/lang/System", "err", "Ljava/io/PrintStream;")
        .and_then(|v| v.l())
        .map_err(|e| failure(env, e))?;
    env.call_static_method(
        "java/lang/System",
        "setOut",
        "(Ljava/io/PrintStream;)V",
        &[(&err_stream).into()],
    )
    .map_err(|e| failure(env, e))?;
    Ok(())
}

fn new_headless<'local>(env: &mut JNIEnv<'local>) -> Result<JObject<'local>, EngineFailure> {
    env.call_static_method(
        HEADLESS_CLASS,
        "newInstance",
        "()Lorg/nlogo/headless/HeadlessWorkspace;",
        &[],
    )
    .and_then(|v| v.l())
    .map_err(|e| failure(env, e))
}

fn start_app<'local>(env: &mut JNIEnv<'local>) -> Result<JObject<'local>, EngineFailure> {
    let argv = env
        .new_object_array(0, "java/lang/String", JObject::null())
        .map_err(|e| failure(env, e))?;
    env.call_static_method(APP_CLASS, "main", "([Ljava/lang/String;)V", &[(&argv).into()])
        .map_err(|e| failure(env, e))?;

    let started = Instant::now();
    loop {
        let app = env
            .call_static_method(APP_CLASS, "app", "()Lorg/nlogo/app/App;", &[])
            .and_then(|v| v.l())
            .map_err(|e| failure(env, e))?;
        if !app.is_null() {
            return Ok(app);
        }
        if started.elapsed() > APP_STARTUP_TIMEOUT {
            return Err(EngineFailure::new(
                "NetLogo desktop application did not start in time",
            ));
        }
        std::thread::sleep(Duration::from_millis(200));
    }
}

fn call<'local>(
    env: &mut JNIEnv<'local>,
    target: &GlobalRef,
    name: &str,
    sig: &str,
    args: &[JValue],
) -> Result<JValueOwned<'local>, EngineFailure> {
    env.call_method(target, name, sig, args)
        .map_err(|e| failure(env, e))
}

fn is_missing_method(failure: &EngineFailure) -> bool {
    failure.message.contains("NoSuchMethodError") || failure.message.contains("Method not found")
}

/// Turn a JNI error into an engine failure, clearing any pending Java
/// exception and using its `toString()` when there is one.
fn failure(env: &mut JNIEnv, err: jni::errors::Error) -> EngineFailure {
    if env.exception_check().unwrap_or(false) {
        let throwable = env.exception_occurred();
        let _ = env.exception_clear();
        if let Ok(throwable) = throwable {
            if let Some(text) = describe(env, &throwable) {
                return EngineFailure::new(text);
            }
        }
    }
    EngineFailure::new(err.to_string())
}

fn describe(env: &mut JNIEnv, obj: &JObject) -> Option<String> {
    let text = env
        .call_method(obj, "toString", "()Ljava/lang/String;", &[])
        .ok()?
        .l()
        .ok()?;
    let text = JString::from(text);
    let value: String = env.get_string(&text).ok()?.into();
    Some(value)
}

fn convert<'local>(
    env: &mut JNIEnv<'local>,
    obj: JObject<'local>,
) -> jni::errors::Result<EngineValue> {
    if obj.is_null() {
        return Ok(EngineValue::Nothing);
    }
    if env.is_instance_of(&obj, "java/lang/Boolean")? {
        let value = env.call_method(&obj, "booleanValue", "()Z", &[])?.z()?;
        return Ok(EngineValue::Boolean(value));
    }
    if env.is_instance_of(&obj, "java/lang/Double")? || env.is_instance_of(&obj, "java/lang/Float")?
    {
        let value = env.call_method(&obj, "doubleValue", "()D", &[])?.d()?;
        return Ok(EngineValue::Float(value));
    }
    if env.is_instance_of(&obj, "java/lang/Number")? {
        let value = env.call_method(&obj, "longValue", "()J", &[])?.j()?;
        return Ok(EngineValue::Integer(value));
    }
    if env.is_instance_of(&obj, "java/lang/String")? {
        let text = JString::from(obj);
        let value: String = env.get_string(&text)?.into();
        return Ok(EngineValue::Text(value));
    }
    if env.is_instance_of(&obj, LOGO_LIST_CLASS)? {
        let size = env.call_method(&obj, "size", "()I", &[])?.i()?;
        let mut items = Vec::with_capacity(size.max(0) as usize);
        for index in 0..size {
            let item = env.with_local_frame(8, |env| -> jni::errors::Result<EngineValue> {
                let element = env
                    .call_method(&obj, "get", "(I)Ljava/lang/Object;", &[JValue::Int(index)])?
                    .l()?;
                convert(env, element)
            })?;
            items.push(item);
        }
        return Ok(EngineValue::List(items));
    }

    let class = env.call_method(&obj, "getClass", "()Ljava/lang/Class;", &[])?.l()?;
    let name = env
        .call_method(&class, "getName", "()Ljava/lang/String;", &[])?
        .l()?;
    let name = JString::from(name);
    let type_name: String = env.get_string(&name)?.into();
    if type_name == NOBODY_CLASS_NAME {
        return Ok(EngineValue::Nothing);
    }
    let repr = env
        .call_method(&obj, "toString", "()Ljava/lang/String;", &[])?
        .l()?;
    let repr = JString::from(repr);
    let repr: String = env.get_string(&repr)?.into();
    Ok(EngineValue::Foreign { type_name, repr })
}
