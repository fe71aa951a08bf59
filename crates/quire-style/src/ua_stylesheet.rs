//! User-Agent Stylesheet
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents elements
//! of HTML documents in ways consistent with general user expectations."
//!
//! UA rules have the lowest priority in the cascade: any author rule overrides
//! a UA rule regardless of specificity.

use std::sync::OnceLock;

use crate::sheet::Stylesheet;

/// [WHATWG HTML § 15.3 Rendering — Suggested default style sheet](https://html.spec.whatwg.org/multipage/rendering.html#the-css-user-agent-style-sheet-and-presentational-hints)
///
/// Default rules for the elements the builder knows, plus the paged-media
/// and footnote defaults from CSS GCPM.
const UA_CSS: &str = r#"
/* [§ 15.3.1 Hidden elements](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements) */
area, base, basefont, datalist, head, link, meta, noembed,
noframes, param, rp, script, style, template, title {
    display: none;
}

/* [§ 15.3.3 Flow content](https://html.spec.whatwg.org/multipage/rendering.html#flow-content-3) */
address, article, aside, blockquote, body, center, dd, details,
dialog, dir, div, dl, dt, fieldset, figcaption, figure, footer,
form, h1, h2, h3, h4, h5, h6, header, hgroup, hr, html, legend,
listing, main, menu, nav, ol, p, plaintext, pre, search,
section, summary, ul, xmp {
    display: block;
}

/* [§ 15.3.7 Lists](https://html.spec.whatwg.org/multipage/rendering.html#lists) */
li { display: list-item; }
ol, ul, menu, dir { counter-reset: list-item; padding-left: 40px; }
ul, menu, dir { list-style-type: disc; }
ol { list-style-type: decimal; }
ul ul { list-style-type: circle; }
ol, ul { margin: 1em 0; }
ol ol, ol ul, ul ol, ul ul { margin: 0; }
dd { margin-left: 40px; }

/* [§ 15.3.8 Tables](https://html.spec.whatwg.org/multipage/rendering.html#tables-2) */
table { display: table; border-spacing: 2px; border-collapse: separate; }
caption { display: table-caption; text-align: center; }
colgroup { display: table-column-group; }
col { display: table-column; }
thead { display: table-header-group; }
tbody { display: table-row-group; }
tfoot { display: table-footer-group; }
tr { display: table-row; }
td, th { display: table-cell; padding: 1px; }
th { font-weight: bold; text-align: center; }

/* [§ 15.3.3 Flow content](https://html.spec.whatwg.org/multipage/rendering.html#flow-content-3) */
body { margin: 8px; }
p, blockquote, figure, dl { margin: 1em 0; }
blockquote, figure { margin-left: 40px; margin-right: 40px; }
pre, listing, xmp, plaintext { white-space: pre; margin: 1em 0; font-family: monospace; }
hr { border-style: inset; border-width: 1px; margin: 0.5em auto; }

/* [§ 15.3.6 Sections and headings](https://html.spec.whatwg.org/multipage/rendering.html#sections-and-headings) */
h1 { font-size: 2em; font-weight: bold; margin: 0.67em 0; }
h2 { font-size: 1.5em; font-weight: bold; margin: 0.83em 0; }
h3 { font-size: 1.17em; font-weight: bold; margin: 1em 0; }
h4 { font-weight: bold; margin: 1.33em 0; }
h5 { font-size: 0.83em; font-weight: bold; margin: 1.67em 0; }
h6 { font-size: 0.67em; font-weight: bold; margin: 2.33em 0; }

/* [§ 15.3.4 Phrasing content](https://html.spec.whatwg.org/multipage/rendering.html#phrasing-content-3) */
b, strong { font-weight: bold; }
i, em, cite, var, dfn { font-style: italic; }
code, kbd, samp, tt { font-family: monospace; }
sub { vertical-align: sub; font-size: smaller; }
sup { vertical-align: super; font-size: smaller; }
small { font-size: smaller; }
big { font-size: larger; }
nobr { white-space: nowrap; }
q::before { content: open-quote; }
q::after { content: close-quote; }
center { text-align: center; }

/* [GCPM § 2.4 Footnote calls and markers](https://www.w3.org/TR/css-gcpm-3/#footnote-call) */
::footnote-call {
    content: counter(footnote);
    vertical-align: super;
    font-size: smaller;
}
::footnote-marker {
    content: counter(footnote) '. ';
}

/* [CSS Paged Media § 7.2](https://www.w3.org/TR/css-page-3/#page-size-prop) */
@page {
    margin: 75px;
}
"#;

/// The parsed default style sheet.
///
/// The stylesheet is parsed once and cached via `OnceLock`.
pub fn ua_stylesheet() -> &'static Stylesheet {
    static STYLESHEET: OnceLock<Stylesheet> = OnceLock::new();
    STYLESHEET.get_or_init(|| Stylesheet::parse(UA_CSS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ua_sheet_parses_cleanly() {
        let sheet = ua_stylesheet();
        assert!(sheet.errors.is_empty(), "{:?}", sheet.errors);
        assert_eq!(sheet.page_rules.len(), 1);
        assert!(sheet.rules.len() > 30);
    }
}
