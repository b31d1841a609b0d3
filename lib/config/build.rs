use serde::Deserialize;
use serde_json::Value;
use std::{collections::BTreeMap, env, fs, path::PathBuf};

#[derive(Deserialize)]
struct Flag {
    #[serde(rename = "type")]
    ty: String,
    value: Value,
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let flags_str = fs::read_to_string(PathBuf::from(manifest_dir).join("flags.json")).unwrap();
    let flagmap: BTreeMap<String, Flag> = serde_json::from_str(&flags_str).unwrap();
    make_flags(&flagmap);
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=flags.json");
}

fn make_flags(flagmap: &BTreeMap<String, Flag>) {
    let mut s = String::new();
    for (key, flag) in flagmap {
        let line = match (flag.ty.as_str(), &flag.value) {
            ("str", Value::String(v)) => format!("pub const {}: &str = {:?};\n", key, v),
            (ty, Value::Number(n)) => format!("pub const {}: {} = {};\n", key, ty, n),
            (ty, v) => panic!("Unsupported flag '{}': type {} with value {}.", key, ty, v),
        };
        s += line.as_str();
    }
    let out_dir = env::var("OUT_DIR").unwrap();
    let path = PathBuf::from(out_dir).join("build_flags.rs");
    fs::write(path, s).unwrap();
}
