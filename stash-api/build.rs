//! Build script for the STASH API
//!
//! Compiles the Protocol Buffer definitions into Rust code using
//! tonic-build. The generated code provides the gRPC service trait and
//! message types for the cache service.

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure()
        // Generate server code (we're implementing the service)
        .build_server(true)
        // Generate client code (useful for testing)
        .build_client(true)
        .compile_protos(&["proto/stash.proto"], &["proto"])?;

    // Tell cargo to rerun this build script if the proto file changes
    println!("cargo:rerun-if-changed=proto/stash.proto");

    Ok(())
}
