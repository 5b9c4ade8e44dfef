#![no_main]

//! Drive a mounted page with arbitrary clicks, keys, frames, and waits and
//! check the viewer invariants after every step.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mklb_harness::{Page, check_invariants};

#[derive(Debug, Arbitrary)]
struct Input {
    /// Gallery index per image; `None` makes the image standalone.
    images: Vec<Option<u8>>,
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Trigger(u8),
    Close(u8),
    Backdrop(u8),
    Previous(u8),
    Next(u8),
    Escape,
    Left,
    Right,
    Frame,
    Wait(u16),
}

fuzz_target!(|input: Input| {
    if input.images.is_empty() || input.images.len() > 32 || input.ops.len() > 256 {
        return;
    }

    let page = Page::new();
    for (i, group) in input.images.iter().enumerate() {
        let src = format!("{i}.jpg");
        match group {
            Some(g) => page.gallery_image(&src, &format!("g{}", g % 4)),
            None => page.image(&src),
        };
    }
    let lightbox = page.mount();
    let viewers = lightbox.viewers();
    assert!(!viewers.is_empty());
    let pick = |n: u8| &viewers[n as usize % viewers.len()];

    for op in &input.ops {
        match *op {
            Op::Trigger(n) => page.click(*pick(n).trigger()),
            Op::Close(n) => page.click(pick(n).overlay().close),
            Op::Backdrop(n) => page.click(pick(n).overlay().wrapper),
            Op::Previous(n) => page.click(pick(n).overlay().previous),
            Op::Next(n) => page.click(pick(n).overlay().next),
            Op::Escape => page.key("Escape"),
            Op::Left => page.key("ArrowLeft"),
            Op::Right => page.key("ArrowRight"),
            Op::Frame => page.frame(),
            Op::Wait(ms) => page.wait(u64::from(ms % 1000)),
        }
        if let Err(violation) = check_invariants(&page, &lightbox, page.is_idle()) {
            panic!("{violation} after {op:?}");
        }
    }

    page.settle();
    if let Err(violation) = check_invariants(&page, &lightbox, true) {
        panic!("{violation} after settling");
    }
});
