use chrono::DateTime;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::builtin;
use crate::post::Post;
use crate::reach::{RankedPost, ReachReport};

const STATUS_URL_BASE: &str = "https://twitter.com/twitterapi/status";

/// `Thu, 06 Oct 2011 19:36:17 +0000` (search API) or
/// `Wed Aug 27 13:08:45 +0000 2008` (REST API) → `October 6, 2011`.
pub fn format_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let parsed = DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %z %Y"))
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()?;
    Some(parsed.format("%B %-d, %Y").to_string())
}

pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn status_url(post: &Post) -> String {
    format!("{}/{}", STATUS_URL_BASE, post.id)
}

/// Embed blockquote for a single post.
pub fn render_embed(post: &Post) -> Markup {
    let date = format_date(&post.created_at).unwrap_or_else(|| post.created_at.clone());

    html! {
        blockquote class="twitter-tweet" {
            p { (post.text) }
            (PreEscaped("&mdash; "))
            (post.display_name()) " (@" (post.author) ") "
            a href=(status_url(post)) data-datetime=(post.created_at) { (date) }
        }
    }
}

fn render_summary(report: &ReachReport) -> Markup {
    html! {
        div class="tr-hero" {
            h1 { "Total Reach: " (group_thousands(report.total_reach)) }
            p {
                strong { (group_thousands(report.posts.len() as u64)) }
                " Results for \"" em { (report.query) } "\""
            }
        }
    }
}

fn render_row(p: &RankedPost) -> Markup {
    html! {
        div class="tr-row" {
            div class="tr-reach" {
                h3 { (group_thousands(p.reach)) }
            }
            div class="tr-post" {
                (render_embed(&p.post))
            }
        }
    }
}

/// Summary header and post rows without the surrounding document.
pub fn build_fragment(report: &ReachReport) -> String {
    let markup = html! {
        (render_summary(report))
        @for p in &report.posts {
            (render_row(p))
        }
    };
    markup.into_string()
}

pub fn build_report_html(report: &ReachReport) -> String {
    let title = format!("Reach for \"{}\"", report.query);

    let markup: Markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(builtin::REPORT_CSS)) }
            }
            body class="tr" {
                main class="tr-container" {
                    (render_summary(report))
                    @for p in &report.posts {
                        (render_row(p))
                    }
                }
            }
        }
    };
    markup.into_string()
}
