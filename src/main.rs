//! LensOrder CLI (for testing purposes only)
//! The main interface is through WASM bindings.

use lens_order::{Axis, AxisSign, LayoutConstraints};

fn main() {
    let constraints = LayoutConstraints::default();

    println!("LensOrder Invoice Core");
    println!("======================");
    println!();
    println!(
        "Power matrix: {} sphere rows x {} cylinder columns",
        Axis::sphere(AxisSign::Minus).len(),
        Axis::cylinder(AxisSign::Minus).len()
    );
    println!(
        "Invoice table: {:.0} mm per page, up to {} rows per page",
        constraints.content_height(),
        constraints.max_rows_per_page()
    );
    println!();
    println!("This is a library crate. To use it:");
    println!();
    println!("  1. Build WASM: wasm-pack build --target web");
    println!("  2. Serve export_bridge.js alongside html2canvas and jsPDF");
    println!();
    println!("For testing the core library:");
    println!("  cargo test");
}
