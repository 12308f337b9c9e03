use criterion::{black_box, criterion_group, criterion_main, Criterion};
use storage::{Freelist, Pager, DEFAULT_PAGE_SIZE};

fn bench_freelist(c: &mut Criterion) {
    c.bench_function("freelist next/release", |b| {
        let mut flist = Freelist::new();
        b.iter(|| {
            let num = flist.next();
            flist.release(black_box(num));
        })
    });

    let mut flist = Freelist::new();
    for _ in 0..400 {
        let num = flist.next();
        flist.release(num + 1_000);
    }
    c.bench_function("freelist serialize 400", |b| {
        b.iter(|| black_box(flist.serialize()))
    });
}

fn bench_pager(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut pager = Pager::open(dir.path().join("bench"), DEFAULT_PAGE_SIZE).unwrap();

    let mut page = pager.allocate().with_num(2);
    page.write(&[0xAB; DEFAULT_PAGE_SIZE]);

    c.bench_function("pager write page", |b| {
        b.iter(|| pager.write(black_box(&page)).unwrap())
    });
    c.bench_function("pager read page", |b| {
        b.iter(|| black_box(pager.read(2).unwrap()))
    });
    c.bench_function("pager flush", |b| b.iter(|| pager.flush().unwrap()));
}

criterion_group!(benches, bench_freelist, bench_pager);
criterion_main!(benches);
