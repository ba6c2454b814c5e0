//! Stylesheet written to `assets/folio.css`.

pub(crate) const STYLESHEET_PATH: &str = "assets/folio.css";

pub(crate) const STYLESHEET: &str = r#":root {
  --fg: #1f2328;
  --muted: #59636e;
  --border: #d1d9e0;
  --accent: #0969da;
  --bg-subtle: #f6f8fa;
  font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
  color: var(--fg);
}

body { margin: 0; line-height: 1.6; }
a { color: var(--accent); text-decoration: none; }
a:hover { text-decoration: underline; }

.banner { background: var(--accent); color: #fff; text-align: center; padding: 0.4rem 1rem; font-size: 0.9rem; }
.banner a { color: #fff; text-decoration: underline; }

.navbar { display: flex; align-items: center; gap: 1.5rem; padding: 0.75rem 1.5rem; border-bottom: 1px solid var(--border); }
.navbar-title { font-weight: 600; font-size: 1.1rem; color: var(--fg); }
.navbar-links { display: flex; gap: 1rem; }
.navbar-links a { color: var(--muted); }
.navbar-links a.active { color: var(--fg); font-weight: 600; }
.search { margin-left: auto; }
.search input { padding: 0.3rem 0.6rem; border: 1px solid var(--border); border-radius: 6px; }

.layout { display: flex; max-width: 90rem; margin: 0 auto; }
.sidebar { width: 16rem; flex-shrink: 0; padding: 1.5rem 1rem; border-right: 1px solid var(--border); }
.sidebar ul { list-style: none; padding-left: 0.75rem; margin: 0; }
.sidebar > nav > ul { padding-left: 0; }
.sidebar li { margin: 0.2rem 0; }
.sidebar li > a { color: var(--muted); }
.sidebar li.active > a { color: var(--accent); font-weight: 600; }
.sidebar .nav-group { margin-top: 1rem; font-size: 0.75rem; font-weight: 600; text-transform: uppercase; color: var(--muted); }

.content { flex: 1; min-width: 0; padding: 1.5rem 2.5rem 3rem; }
.breadcrumbs ol { display: flex; flex-wrap: wrap; list-style: none; padding: 0; margin: 0 0 1rem; font-size: 0.9rem; }
.breadcrumbs li + li::before { content: "/"; margin: 0 0.5rem; color: var(--muted); }
.page-header { margin-bottom: 1.5rem; }
.page-description { color: var(--muted); font-size: 1.1rem; }
.page-header time { color: var(--muted); font-size: 0.9rem; }
.tags { display: flex; gap: 0.5rem; list-style: none; padding: 0; }
.tags a { background: var(--bg-subtle); border-radius: 999px; padding: 0.1rem 0.6rem; font-size: 0.85rem; }

pre { background: var(--bg-subtle); padding: 1rem; overflow-x: auto; border-radius: 6px; }
code { font-family: ui-monospace, SFMono-Regular, Menlo, monospace; font-size: 0.9em; }
table { border-collapse: collapse; }
th, td { border: 1px solid var(--border); padding: 0.4rem 0.8rem; }
.align-left { text-align: left; }
.align-center { text-align: center; }
.align-right { text-align: right; }
blockquote { margin: 0; padding-left: 1rem; border-left: 4px solid var(--border); color: var(--muted); }

.callout { display: flex; gap: 0.75rem; margin: 1rem 0; padding: 0.75rem 1rem; border: 1px solid var(--border); border-radius: 6px; background: var(--bg-subtle); }
.callout-body > :first-child { margin-top: 0; }
.callout-body > :last-child { margin-bottom: 0; }
.callout-title { font-weight: 600; }
.callout-info { border-color: #54aeff; background: #ddf4ff; }
.callout-warning { border-color: #d4a72c; background: #fff8c5; }
.callout-error { border-color: #ff8182; background: #ffebe9; }
.callout-important { border-color: #c297ff; background: #fbefff; }

.prev-next { display: flex; justify-content: space-between; margin-top: 3rem; padding-top: 1rem; border-top: 1px solid var(--border); }
.prev-next span { display: block; font-size: 0.8rem; color: var(--muted); }
.prev-next .next { margin-left: auto; text-align: right; }

.toc { width: 14rem; flex-shrink: 0; padding: 1.5rem 1rem; font-size: 0.9rem; }
.toc h2 { font-size: 0.75rem; text-transform: uppercase; color: var(--muted); }
.toc ul { list-style: none; padding: 0; }
.toc .toc-depth-1 { padding-left: 0.75rem; }
.toc .toc-depth-2 { padding-left: 1.5rem; }

.listing { list-style: none; padding: 0; }
.listing li { margin-bottom: 1rem; }
.listing time { color: var(--muted); font-size: 0.85rem; margin-left: 0.5rem; }
.listing p { margin: 0.25rem 0 0; color: var(--muted); }
.tag-index .count { color: var(--muted); font-size: 0.85rem; }

.footer { border-top: 1px solid var(--border); padding: 1.5rem; text-align: center; color: var(--muted); font-size: 0.9rem; }

@media (max-width: 60rem) {
  .toc { display: none; }
}
@media (max-width: 45rem) {
  .layout { flex-direction: column; }
  .sidebar { width: auto; border-right: none; border-bottom: 1px solid var(--border); }
  .content { padding: 1rem; }
}
"#;
