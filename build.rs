extern crate gl_generator;

use std::env;
use std::fs::File;
use std::path::Path;

use gl_generator::{Api, Fallbacks, Profile, Registry, StructGenerator};

fn main() {
    let out_dir = env::var_os("OUT_DIR").expect("OUT_DIR not set by cargo");
    let dest = Path::new(&out_dir);

    let mut file = File::create(dest.join("gl_bindings.rs")).unwrap();

    // This generates bindings for OpenGL ES v2.0
    Registry::new(Api::Gles2,       // namespace
                  (2, 0),           // version
                  Profile::Core,    // profile
                  Fallbacks::All,   // fallbacks
                  [])               // extensions
        .write_bindings(StructGenerator, &mut file)
        .unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}
