#[cfg(feature = "generate")]
fn main() {
    let mut config = prost_build::Config::new();
    config.bytes(["."]);

    tonic_build::configure()
        .out_dir("src")
        .build_client(true)
        .build_server(false)
        .compile_protos_with_config(config, &["proto/catalog.proto"], &["proto"])
        .expect("tonic build failed");
}

#[cfg(not(feature = "generate"))]
fn main() {}
