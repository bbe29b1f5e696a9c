use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dermai_coach::prompt::{build_request, sanitize_user_text};
use dermai_coach::response::{Resource, extract_json, parse_reply};

const BARE: &str = r#"{"visualInterpretation": "Dry, slightly red patch on the inner elbow.", "symptomSummary": "Itching after swimming, worse at night.", "wellnessSuggestions": ["Rinse off pool water promptly", "Apply a fragrance-free moisturizer twice daily", "Try a cool compress"], "trackableSummary": "Itch 4/10, redness fading.", "disclaimer": "Not medical advice."}"#;

fn replies() -> Vec<(&'static str, String)> {
    vec![
        ("bare", BARE.to_string()),
        ("fenced", format!("```json\n{BARE}\n```")),
        (
            "prose",
            format!("Here is your wellness summary:\n\n{BARE}\n\nStay well!"),
        ),
        ("garbage", "The model could not respond today.".to_string()),
    ]
}

fn citations(count: usize) -> Vec<Resource> {
    (0..count)
        .map(|idx| {
            Resource::new(
                format!("Source {idx}"),
                format!("https://example{}.org/article", idx % 4),
            )
        })
        .collect()
}

fn bench_extract_json(c: &mut Criterion) {
    for (label, reply) in replies() {
        c.bench_with_input(BenchmarkId::new("extract_json", label), &reply, |b, reply| {
            b.iter(|| black_box(extract_json(reply).len()));
        });
    }
}

fn bench_parse_reply(c: &mut Criterion) {
    for count in [0usize, 8, 32] {
        let reply = format!("```json\n{BARE}\n```");
        let sources = citations(count);
        c.bench_with_input(
            BenchmarkId::new("parse_reply", count),
            &(reply, sources),
            |b, (reply, sources)| {
                b.iter(|| {
                    let parsed = parse_reply(reply, sources.clone());
                    black_box(parsed.resources().len());
                });
            },
        );
    }
}

fn bench_prompt(c: &mut Criterion) {
    let noisy = "itchy <b>red</b> patch, size < 2cm > 1cm <script>alert(1)</script> ".repeat(32);
    c.bench_function("prompt::sanitize_user_text", |b| {
        b.iter(|| black_box(sanitize_user_text(&noisy).len()));
    });
    c.bench_function("prompt::build_request", |b| {
        b.iter(|| black_box(build_request(&noisy, None).contents.len()));
    });
}

criterion_group!(benches, bench_extract_json, bench_parse_reply, bench_prompt);
criterion_main!(benches);
