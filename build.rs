use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const BUNDLE_ENV: &str = "TEX2SVG_MATHJAX_BUNDLE";

fn main() {
    println!("cargo:rerun-if-changed=js/src/index.js");
    println!("cargo:rerun-if-changed=js/package.json");
    println!("cargo:rerun-if-changed=js/out/index.js");
    println!("cargo:rerun-if-env-changed={BUNDLE_ENV}");

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let dest = out_dir.join("mathjax.js");

    // A prebuilt bundle wins over building one
    if let Some(prebuilt) = env::var_os(BUNDLE_ENV) {
        copy_bundle(Path::new(&prebuilt), &dest);
        return;
    }
    let manifest_dir =
        PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo"));
    let js_dir = manifest_dir.join("js");
    let local = js_dir.join("out").join("index.js");
    if local.exists() {
        copy_bundle(&local, &dest);
        return;
    }

    if !js_dir.join("node_modules").exists() {
        run(Command::new(npm()).arg("install").current_dir(&js_dir));
    }
    let esbuild = js_dir.join("node_modules").join(".bin").join(if cfg!(windows) {
        "esbuild.cmd"
    } else {
        "esbuild"
    });
    run(Command::new(esbuild)
        .current_dir(&js_dir)
        .args([
            "src/index.js",
            "--bundle",
            "--format=esm",
            "--platform=neutral",
            "--main-fields=module,main",
            "--banner:js=var global = globalThis;",
        ])
        .arg(format!("--outfile={}", dest.display())));
}

fn npm() -> &'static str {
    if cfg!(windows) {
        "npm.cmd"
    } else {
        "npm"
    }
}

fn copy_bundle(from: &Path, to: &Path) {
    if let Err(err) = fs::copy(from, to) {
        panic!("failed to copy MathJax bundle from {}: {err}", from.display());
    }
}

fn run(command: &mut Command) {
    let status = command.status().unwrap_or_else(|err| {
        panic!(
            "failed to run {:?}: {err}; install Node.js or set {BUNDLE_ENV} to a prebuilt bundle",
            command.get_program()
        )
    });
    if !status.success() {
        panic!("{:?} exited with {status}", command.get_program());
    }
}
