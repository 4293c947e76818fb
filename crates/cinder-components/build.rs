use std::path::Path;

fn main() {
    let schemas = Path::new(env!("CARGO_MANIFEST_DIR")).join("schemas");
    if let Err(err) = cinder_codegen::build(&schemas) {
        panic!("component schemas failed to compile: {}", err);
    }
}
