use std::sync::Once;

use tracing::debug;
use v8::{Context, Function, Global, OwnedIsolate};

use crate::error::ConversionError;

/// MathJax (TeX input, SVG output) bundled as one ES module by `build.rs`.
static MATHJAX_BUNDLE: &str = include_str!(concat!(env!("OUT_DIR"), "/mathjax.js"));

static INIT_PLATFORM: Once = Once::new();

fn create_origin<'s>(
    scope: &mut v8::HandleScope<'s>,
    filename: &str,
    is_module: bool,
) -> Option<v8::ScriptOrigin<'s>> {
    let name: v8::Local<'s, v8::Value> = v8::String::new(scope, filename)?.into();
    Some(v8::ScriptOrigin::new(
        scope, name, 0, 0, false, 0, name, false, false, is_module,
    ))
}

// The bundle has no imports, so nothing ever needs resolving.
fn module_callback<'s>(
    _context: v8::Local<'s, v8::Context>,
    _name: v8::Local<'s, v8::String>,
    _arr: v8::Local<'s, v8::FixedArray>,
    _module: v8::Local<'s, v8::Module>,
) -> Option<v8::Local<'s, v8::Module>> {
    None
}

/// Reads `error.message` off the caught exception, falling back to its string form.
fn exception_message(tc: &mut v8::TryCatch<v8::HandleScope>) -> Option<String> {
    let exception = tc.exception()?;
    if let Some(object) = exception.to_object(tc) {
        let key = v8::String::new(tc, "message")?;
        if let Some(message) = object.get(tc, key.into()).filter(|m| m.is_string()) {
            return Some(message.to_rust_string_lossy(tc));
        }
    }
    Some(exception.to_rust_string_lossy(tc))
}

fn engine_failure(tc: &mut v8::TryCatch<v8::HandleScope>, what: &str) -> ConversionError {
    match exception_message(tc) {
        Some(message) => ConversionError::engine(format!("{what}: {message}")),
        None => ConversionError::engine(what),
    }
}

/// Compiles and evaluates the bundle, returning its default export.
fn load_bundle(scope: &mut v8::HandleScope) -> Result<Global<Function>, ConversionError> {
    let tc = &mut v8::TryCatch::new(scope);

    let code = v8::String::new(tc, MATHJAX_BUNDLE)
        .ok_or_else(|| ConversionError::engine("MathJax bundle does not fit in a V8 string"))?;
    let origin = create_origin(tc, "mathjax.js", true)
        .ok_or_else(|| ConversionError::engine("failed to create script origin"))?;
    let source = v8::script_compiler::Source::new(code, Some(&origin));
    let module = match v8::script_compiler::compile_module(tc, source) {
        Some(module) => module,
        None => return Err(engine_failure(tc, "failed to compile the MathJax bundle")),
    };

    if module.instantiate_module(tc, module_callback) != Some(true) {
        return Err(engine_failure(tc, "failed to instantiate the MathJax bundle"));
    }
    if module.evaluate(tc).is_none() {
        return Err(engine_failure(tc, "failed to evaluate the MathJax bundle"));
    }
    if module.get_status() == v8::ModuleStatus::Errored {
        let message = module.get_exception().to_rust_string_lossy(tc);
        return Err(ConversionError::engine(format!(
            "MathJax bundle threw during startup: {message}"
        )));
    }

    let namespace = module
        .get_module_namespace()
        .to_object(tc)
        .ok_or_else(|| ConversionError::engine("module namespace is not an object"))?;
    let key = v8::String::new(tc, "default")
        .ok_or_else(|| ConversionError::engine("failed to allocate export name"))?;
    let export = namespace
        .get(tc, key.into())
        .ok_or_else(|| ConversionError::engine("MathJax bundle has no default export"))?;
    let render = v8::Local::<v8::Function>::try_from(export)
        .map_err(|_| ConversionError::engine("default export is not a function"))?;

    Ok(Global::new(tc, render))
}

/// MathJax running inside a V8 isolate.
///
/// The isolate is tied to the thread that created it, so a `MathJax` is
/// neither `Send` nor `Sync`.
pub struct MathJax {
    // Globals go before the isolate so they are released first.
    context: Global<Context>,
    render: Global<Function>,
    isolate: OwnedIsolate,
}

impl MathJax {
    /// Starts an isolate and evaluates the bundled MathJax in it.
    pub fn new() -> Result<Self, ConversionError> {
        INIT_PLATFORM.call_once(|| {
            let platform = v8::new_default_platform(0, false).make_shared();
            v8::V8::initialize_platform(platform);
            v8::V8::initialize();
        });

        debug!(bundle_bytes = MATHJAX_BUNDLE.len(), "starting MathJax engine");
        let mut isolate = v8::Isolate::new(Default::default());
        let (context, render) = {
            let handle_scope = &mut v8::HandleScope::new(&mut isolate);
            let context = v8::Context::new(handle_scope);
            let global_context = Global::new(handle_scope, context);
            let scope = &mut v8::ContextScope::new(handle_scope, context);
            let render = load_bundle(scope)?;
            (global_context, render)
        };

        Ok(Self {
            context,
            render,
            isolate,
        })
    }

    /// Typesets `tex` and returns the `<svg>` document MathJax produced.
    ///
    /// `display` selects display style; otherwise the math is set inline.
    pub fn to_svg(&mut self, tex: &str, display: bool) -> Result<String, ConversionError> {
        let handle_scope = &mut v8::HandleScope::new(&mut self.isolate);
        let context = v8::Local::new(handle_scope, &self.context);
        let scope = &mut v8::ContextScope::new(handle_scope, context);
        let tc = &mut v8::TryCatch::new(scope);

        let render = v8::Local::new(tc, &self.render);
        let source = v8::String::new(tc, tex)
            .ok_or_else(|| ConversionError::Render("TeX source is too long".to_owned()))?;
        let args: [v8::Local<v8::Value>; 2] = [source.into(), v8::Boolean::new(tc, display).into()];
        let recv: v8::Local<v8::Value> = v8::undefined(tc).into();

        debug!(display, len = tex.len(), "typesetting");
        match render.call(tc, recv, &args) {
            Some(value) if value.is_string() => Ok(value.to_rust_string_lossy(tc)),
            Some(_) => Err(ConversionError::engine("MathJax returned a non-string result")),
            None => Err(ConversionError::Render(
                exception_message(tc).unwrap_or_else(|| "MathJax rejected the input".to_owned()),
            )),
        }
    }
}
