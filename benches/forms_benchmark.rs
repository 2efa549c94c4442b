//! Benchmarks for request preparation
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pdf_tools_client::pdf::operation::build_body;
use pdf_tools_client::pdf::{
    filename_from_disposition, parse_page_order, PdfFile, RotatePagesForm, ToolForm,
    WatermarkForm,
};

fn page_list(count: u32) -> String {
    (1..=count)
        .rev()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Benchmark parsing of reorder input of growing length
fn bench_page_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_order");

    for count in [10, 100, 1000] {
        let input = page_list(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("parse", count), &input, |b, input| {
            b.iter(|| parse_page_order(black_box(input)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark form validation for the tools with the most fields
fn bench_validation(c: &mut Criterion) {
    let watermark = ToolForm::AddWatermark(WatermarkForm {
        watermark_text: "CONFIDENTIAL".to_string(),
        opacity: Some(0.4),
        font_size: Some(48),
        color: Some("#ff0000".to_string()),
        rotation: Some(45),
        output_name: Some("marked.pdf".to_string()),
    });
    let rotate = ToolForm::RotatePages(RotatePagesForm {
        pages: (1..=200).collect(),
        rotations: vec![90],
        output_name: None,
    });

    let mut group = c.benchmark_group("validation");
    group.bench_function("watermark", |b| b.iter(|| black_box(&watermark).errors()));
    group.bench_function("rotate_200_pages", |b| b.iter(|| black_box(&rotate).errors()));
    group.finish();
}

/// Benchmark multipart body assembly with a 1 MB file
fn bench_build_body(c: &mut Criterion) {
    let mut data = b"%PDF-1.7\n".to_vec();
    data.resize(1024 * 1024, b'0');
    let files = vec![PdfFile::from_bytes("large.pdf", data).unwrap()];
    let form = ToolForm::RotatePages(RotatePagesForm {
        pages: vec![1, 2, 3],
        rotations: vec![90, 180, 270],
        output_name: Some("rotated.pdf".to_string()),
    });

    let mut group = c.benchmark_group("build_body");
    group.throughput(Throughput::Bytes(files[0].size() as u64));
    group.bench_function("rotate_1mb", |b| {
        b.iter(|| build_body(black_box(&files), black_box(&form)).unwrap())
    });
    group.finish();
}

fn bench_disposition(c: &mut Criterion) {
    let headers = [
        ("plain", "attachment; filename=\"merged.pdf\""),
        (
            "extended",
            "attachment; filename=\"fallback.pdf\"; filename*=UTF-8''zl%C3%BA%C4%8Den%C3%A9.pdf",
        ),
    ];

    let mut group = c.benchmark_group("content_disposition");
    for (name, header) in headers {
        group.bench_with_input(BenchmarkId::from_parameter(name), header, |b, header| {
            b.iter(|| filename_from_disposition(black_box(header)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_page_order,
    bench_validation,
    bench_build_body,
    bench_disposition,
);

criterion_main!(benches);
