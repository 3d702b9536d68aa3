pub const REPORT_CSS: &str = r#":root {
  color-scheme: light dark;
  --tr-fg: #14171a;
  --tr-muted: #657786;
  --tr-bg: #f5f8fa;
  --tr-card: #ffffff;
  --tr-accent: #1da1f2;
  --tr-border: #e1e8ed;
}

@media (prefers-color-scheme: dark) {
  :root {
    --tr-fg: #e1e8ed;
    --tr-muted: #8899a6;
    --tr-bg: #15202b;
    --tr-card: #192734;
    --tr-border: #38444d;
  }
}

body.tr {
  margin: 0;
  background: var(--tr-bg);
  color: var(--tr-fg);
  font: 15px/1.45 -apple-system, BlinkMacSystemFont, "Segoe UI", Helvetica, Arial, sans-serif;
}

.tr-container {
  max-width: 880px;
  margin: 0 auto;
  padding: 0 16px;
}

.tr-hero {
  padding: 32px 0 16px;
  border-bottom: 1px solid var(--tr-border);
}

.tr-hero h1 {
  margin: 0 0 8px;
  font-size: 32px;
}

.tr-row {
  display: flex;
  gap: 16px;
  padding: 16px 0;
  border-bottom: 1px solid var(--tr-border);
}

.tr-reach {
  flex: 0 0 140px;
  text-align: right;
}

.tr-reach h3 {
  margin: 0;
  color: var(--tr-accent);
}

.tr-post {
  flex: 1 1 auto;
  min-width: 0;
}

.tr-post blockquote.twitter-tweet {
  margin: 0;
  padding: 12px 16px;
  background: var(--tr-card);
  border: 1px solid var(--tr-border);
  border-radius: 8px;
}

.tr-post blockquote.twitter-tweet p {
  margin: 0 0 8px;
  overflow-wrap: anywhere;
}

.tr-post blockquote.twitter-tweet a {
  color: var(--tr-muted);
}
"#;
