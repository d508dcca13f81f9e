//! Version command handler

/// Display version information
pub fn display_version() {
    println!("fluxgraph {}", env!("CARGO_PKG_VERSION"));
    println!("  {}", env!("CARGO_PKG_DESCRIPTION"));
    println!("  {}", env!("CARGO_PKG_AUTHORS"));
    println!("  License: {}", env!("CARGO_PKG_LICENSE"));
    match crate::kube::get_context() {
        Ok(context) => println!("  Kubernetes context: {}", context),
        Err(_) => println!("  Kubernetes context: <none>"),
    }
}
