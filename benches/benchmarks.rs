//! Benchmarks for the invoice core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lens_order::render::render_document_html;
use lens_order::{
    paginate, reduce_to_printable, Axis, AxisSign, CellKey, InvoiceDocument, LayoutConstraints,
    OrderMetadata, PowerGrid, PrintPlan,
};

fn full_grid() -> PowerGrid {
    let mut grid = PowerGrid::new();
    for sphere in 0..81 {
        for cylinder in 0..25 {
            grid.set_quantity(CellKey::new(sphere, cylinder), ((sphere + cylinder) % 7 + 1) as i64);
        }
    }
    grid
}

fn sparse_grid() -> PowerGrid {
    let mut grid = PowerGrid::new();
    grid.set_quantity(CellKey::new(3, 2), 4);
    grid.set_quantity(CellKey::new(48, 8), 2);
    grid.set_quantity(CellKey::new(12, 0), 10);
    grid
}

fn bench_reduce_sparse(c: &mut Criterion) {
    c.bench_function("reduce_sparse_grid", |b| {
        let grid = sparse_grid();
        let rows = Axis::sphere(AxisSign::Minus).values();
        let cols = Axis::cylinder(AxisSign::Minus).values();

        b.iter(|| {
            black_box(reduce_to_printable(black_box(&rows), black_box(&cols), &grid));
        });
    });
}

fn bench_paginate_full_matrix(c: &mut Criterion) {
    c.bench_function("paginate_full_matrix", |b| {
        let rows = Axis::sphere(AxisSign::Minus).values();

        b.iter(|| {
            black_box(paginate(black_box(&rows), 199.0, 5.5, 10.0));
        });
    });
}

fn bench_print_plan(c: &mut Criterion) {
    c.bench_function("print_plan_full_matrix", |b| {
        let grid = full_grid();
        let sphere = Axis::sphere(AxisSign::Minus);
        let cylinder = Axis::cylinder(AxisSign::Plus);
        let constraints = LayoutConstraints::default();

        b.iter(|| {
            black_box(PrintPlan::compute(&grid, &sphere, &cylinder, &constraints));
        });
    });
}

fn bench_render_html(c: &mut Criterion) {
    c.bench_function("render_invoice_html", |b| {
        let grid = full_grid();
        let constraints = LayoutConstraints::default();
        let plan = PrintPlan::compute(
            &grid,
            &Axis::sphere(AxisSign::Minus),
            &Axis::cylinder(AxisSign::Minus),
            &constraints,
        );
        let document = InvoiceDocument::build(&OrderMetadata::default(), &grid, &plan);

        b.iter(|| {
            black_box(render_document_html(&document, &constraints));
        });
    });
}

criterion_group!(
    benches,
    bench_reduce_sparse,
    bench_paginate_full_matrix,
    bench_print_plan,
    bench_render_html,
);

criterion_main!(benches);
