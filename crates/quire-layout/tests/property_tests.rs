//! Property tests over whole documents.

mod common;

use quickcheck_macros::quickcheck;

use quire_common::Diagnostics;
use quire_dom::markup;
use quire_layout::debug::dump_pages;
use quire_layout::{LayoutContext, LayoutOptions, MonospaceShaper, NoHyphenation, NoImages, build, preferred};
use quire_style::RuleResolver;

use common::{by_id, page_texts, render_small};

/// Words of 1 to 8 letters from arbitrary bytes.
fn words(lengths: &[u8]) -> Vec<String> {
    lengths
        .iter()
        .take(40)
        .enumerate()
        .map(|(i, n)| {
            let letter = char::from(b'a' + (i % 26) as u8);
            std::iter::repeat_n(letter, usize::from(n % 8) + 1).collect()
        })
        .collect()
}

#[quickcheck]
fn prop_preferred_widths_ordered_and_stable(lengths: Vec<u8>) -> bool {
    let text = words(&lengths).join(" ");
    let dom = markup::parse(&format!("<div>{text}</div><p>x <b>{text}</b></p>"));
    let resolver = RuleResolver::new(&dom, &[""]);
    let built = build::build(&dom, &resolver, &NoImages, &mut Diagnostics::new());

    let options = LayoutOptions::default();
    let shaper = MonospaceShaper::default();
    let mut ctx = LayoutContext::new(&options, &shaper, &NoHyphenation, &NoImages);
    let (min, max) = preferred::content_widths(&mut ctx, &built.root);
    ctx.clear_caches();
    let again = preferred::content_widths(&mut ctx, &built.root);
    min <= max && again == (min, max)
}

#[quickcheck]
fn prop_line_breaking_is_deterministic(lengths: Vec<u8>, width: u8) -> bool {
    let text = words(&lengths).join(" ");
    let css = format!("p {{ margin: 0; width: {}px; font-size: 10px }}", u32::from(width) + 10);
    let html = format!("<p>{text}</p>");
    dump_pages(&render_small(&html, &css)) == dump_pages(&render_small(&html, &css))
}

/// [CSS Text § 7.3](https://www.w3.org/TR/css-text-3/#justify-content)
/// Every justified line but the last fills the line exactly.
#[quickcheck]
fn prop_justified_lines_fill_width(lengths: Vec<u8>, width: u8) -> bool {
    let text = words(&lengths).join(" ");
    let width = f32::from(width % 60) + 30.0;
    let css = format!("p {{ margin: 0; width: {width}px; font-size: 2px; text-align: justify }}");
    let document = render_small(&format!("<p id=p>{text}</p>"), &css);
    let p = by_id(&document, "p");
    let lines = p.lines();
    lines.iter().take(lines.len().saturating_sub(1)).all(|line| {
        if !line.text().trim_end().contains(' ') {
            return true;
        }
        let used: f32 = line.children.iter().map(|c| c.margin_width()).sum();
        (used - p.width).abs() < 0.01
    })
}

#[quickcheck]
fn prop_flex_one_items_share_evenly(count: u8, width: u16) -> bool {
    let n = usize::from(count % 6) + 1;
    let width = f32::from(width % 500) + 10.0;
    let items = "<div></div>".repeat(n);
    let css = format!("#f {{ display: flex; width: {width}px }} #f div {{ flex: 1; height: 1px }}");
    let document = render_small(&format!("<div id=f>{items}</div>"), &css);
    let f = by_id(&document, "f");
    f.children.len() == n
        && f
            .children
            .iter()
            .all(|c| (c.margin_width() - width / n as f32).abs() < 0.01)
}

#[quickcheck]
fn prop_fixed_table_columns_sum_to_width(widths: Vec<u8>, table: u8) -> bool {
    let widths: Vec<u32> = widths.iter().take(6).map(|w| u32::from(w % 20)).collect();
    if widths.is_empty() {
        return true;
    }
    let table_width = widths.iter().sum::<u32>() + u32::from(table % 50) + 1;
    let cells: String = widths
        .iter()
        .map(|w| format!("<td style='width: {w}px'></td>"))
        .collect();
    let css = format!(
        "table {{ table-layout: fixed; width: {table_width}px; border-spacing: 2px }} td {{ padding: 0 }}"
    );
    let document = render_small(&format!("<table id=t><tr>{cells}</tr></table>"), &css);
    let t = by_id(&document, "t");
    let columns: f32 = t.find_by_tag("td").iter().map(|c| c.border_width()).sum();
    let spacing = 2.0 * (widths.len() as f32 + 1.0);
    (columns + spacing - t.border_width()).abs() < 0.01
}

/// [CSS Fragmentation § 4](https://www.w3.org/TR/css-break-3/#breaking-rules)
/// Pages together hold every line exactly once, in order.
#[quickcheck]
fn prop_fragmentation_keeps_every_line(lines: Vec<u8>, page_lines: u8) -> bool {
    let counts: Vec<usize> = lines.iter().take(8).map(|n| usize::from(n % 6) + 1).collect();
    let page_height = (usize::from(page_lines % 6) + 4) * 10;
    let mut html = String::new();
    let mut expected = String::new();
    for (i, count) in counts.iter().enumerate() {
        let words: Vec<String> = (0..*count).map(|j| format!("w{i}x{j}")).collect();
        expected.push_str(&words.concat());
        html.push_str(&format!("<p>{}</p>", words.join("<br>")));
    }
    let css = format!(
        "@page {{ size: 200px {page_height}px }} p {{ margin: 0; font-size: 10px; line-height: 10px }}"
    );
    let document = render_small(&html, &css);
    page_texts(&document).concat() == expected
}
