use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lectern_model::{Document, ElementKind, Mark, Marks, Node};
use lectern_renderer::{render_document, render_html, HtmlOptions, RenderOptions};

fn sample_document(sections: usize) -> Document {
    let mut children = Vec::new();
    for i in 0..sections {
        children.push(Node::element(
            ElementKind::HeadingTwo,
            vec![Node::text(format!("Section {i}"))],
        ));
        children.push(Node::element(
            ElementKind::Paragraph,
            vec![
                Node::text("Plain text with "),
                Node::marked("bold", Marks::default().with(Mark::Bold)),
                Node::text(" and "),
                Node::link("https://docs.dev", "a link"),
                Node::marked(" code", Marks::default().with(Mark::Code).with(Mark::Italic)),
            ],
        ));
        children.push(Node::element(
            ElementKind::BulletedList,
            (0..5)
                .map(|n| Node::element(ElementKind::ListItem, vec![Node::text(format!("item {n}"))]))
                .collect(),
        ));
        children.push(Node::image("https://img.dev/figure.png", "figure"));
    }
    children.push(Node::paragraph(""));
    Document::new(children)
}

fn render_small_document(c: &mut Criterion) {
    let doc = sample_document(5);
    let options = RenderOptions::default();

    c.bench_function("render_small_document", |b| {
        b.iter(|| render_document(black_box(&doc), &options))
    });
}

fn render_large_document_html(c: &mut Criterion) {
    let doc = sample_document(200);
    let options = RenderOptions::read_only();
    let html = HtmlOptions::default();

    c.bench_function("render_large_document_html", |b| {
        b.iter(|| render_html(black_box(&doc), &options, &html))
    });
}

criterion_group!(benches, render_small_document, render_large_document_html);
criterion_main!(benches);
