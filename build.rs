use shadow_rs::ShadowBuilder;

fn main() {
    // Build metadata backs `--version` and the default application version.
    ShadowBuilder::builder()
        .build()
        .expect("failed to generate build metadata");
    println!("cargo:rerun-if-changed=migrations");
}
