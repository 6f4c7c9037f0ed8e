use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scriptform_pagination::{paginate, NeverCancel, PaginationSettings, Paginator};
use scriptform_parser::{Parser, Screenplay, ScreenplayOptions};
use scriptform_styles::{builtin_family, NoSettings};

fn sample_screenplay(scenes: usize) -> String {
    let mut text = String::from("Title: Benchmark\nAuthor: Nobody\n\n");
    for scene in 0..scenes {
        text.push_str(&format!("INT. ROOM {scene} - DAY\n\n"));
        text.push_str("The room is quiet. Dust drifts through a shaft of light that falls across the floor.\n\n");
        text.push_str("ALICE\n(whispering)\nDid you hear that?\nSomething moved downstairs.\n\n");
        text.push_str("BOB ^\nNo.\n\n");
        text.push_str("CUT TO:\n\n");
    }
    text
}

fn paginate_full(c: &mut Criterion) {
    let screenplay = Screenplay::from_parser(&Parser::parse(&sample_screenplay(200)), &ScreenplayOptions::default());
    let family = builtin_family(&NoSettings);
    let settings = PaginationSettings::default();

    c.bench_function("paginate_full_200_scenes", |b| {
        b.iter(|| paginate(black_box(&screenplay), &family.render, &settings))
    });
}

fn paginate_after_edit(c: &mut Criterion) {
    let text = sample_screenplay(200);
    let family = builtin_family(&NoSettings);
    let settings = PaginationSettings::default();
    let options = ScreenplayOptions::default();

    let mut parser = Parser::parse(&text);
    let cache = paginate(&Screenplay::from_parser(&parser, &options), &family.render, &settings);
    let offset = text.rfind("Did you hear").unwrap_or(0);
    let change = parser.insert(offset, "Well. ").unwrap();
    let screenplay = Screenplay::from_parser(&parser, &options);
    let change_at = change.first_changed().unwrap_or(0);
    let paginator = Paginator::new(&family.render, &settings);

    c.bench_function("paginate_incremental_late_edit", |b| {
        b.iter(|| {
            paginator
                .paginate_incremental(black_box(&screenplay), &cache, change_at, &NeverCancel)
                .unwrap()
        })
    });
}

criterion_group!(benches, paginate_full, paginate_after_edit);
criterion_main!(benches);
