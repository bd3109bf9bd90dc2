use std::env;
use std::fs;
use std::path::Path;

// Deja config.toml junto al binario: shared/config.rs lo busca en el
// directorio del ejecutable. Si no hay fichero en la raíz del workspace,
// el binario usa la configuración embebida por defecto.
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let out_dir = env::var("OUT_DIR").unwrap();
    let profile = env::var("PROFILE").unwrap();

    // OUT_DIR cuelga de target/<profile>/build/backend-xxx/out
    let out_path = Path::new(&out_dir);
    let target_dir = match out_path.ancestors().find(|p| p.ends_with(&profile)) {
        Some(dir) => dir,
        None => return,
    };

    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root");

    let source = workspace_root.join("config.toml");
    if source.exists() {
        let dest = target_dir.join("config.toml");
        fs::copy(&source, &dest)
            .unwrap_or_else(|e| panic!("No se pudo copiar config.toml: {e}"));
    }
}
