//! Minimal showcase shell used when no document exists yet.
//!
//! The shell carries everything the rendered page needs client-side:
//! category filtering, the theme toggle, and the pass that hides cards
//! marked `data-disabled="true"`. Both curated regions start empty and are
//! filled in by the renderer.

/// Synthesize a minimal empty showcase document.
pub fn default_document() -> String {
    DEFAULT_SHELL.to_string()
}

const DEFAULT_SHELL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Report Showcase</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/5.15.3/css/all.min.css">
  <style>
    body { font-family: Arial, sans-serif; margin: 0; padding: 0; }
    .container { max-width: 1200px; margin: 0 auto; padding: 20px; }
    .category-bar { display: flex; flex-wrap: wrap; gap: 10px; margin-bottom: 20px; }
    .category-pill { background: #f0f0f0; border: none; padding: 8px 16px; border-radius: 20px; cursor: pointer; }
    .category-pill.active { background: #007bff; color: white; }
    .report-cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(300px, 1fr)); gap: 20px; }
    .report-card { border: 1px solid #ddd; border-radius: 8px; padding: 15px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); }
    .report-title { font-size: 18px; font-weight: bold; margin-bottom: 10px; }
    .report-description { font-size: 14px; color: #666; margin-bottom: 15px; }
    .view-link { display: inline-block; color: #007bff; text-decoration: none; font-size: 14px; }
    body.dark-mode { background-color: #222; color: #eee; }
    body.dark-mode .report-card { background-color: #333; border-color: #444; }
    body.dark-mode .report-description { color: #bbb; }
    body.dark-mode .category-pill { background: #444; color: #eee; }
    body.dark-mode .category-pill.active { background: #0066cc; }
    .theme-toggle { position: fixed; top: 20px; right: 20px; background: none; border: none; color: inherit; font-size: 24px; cursor: pointer; }
  </style>
</head>
<body>
  <div class="container">
    <h1>Report Showcase</h1>
    <div class="category-bar">
      <button class="category-pill active" data-category="all">All Reports</button>
    </div>
    <div class="report-cards">
    </div>
  </div>
  <button class="theme-toggle" id="theme-toggle" aria-label="Toggle Dark Mode">
    <i class="fas fa-moon"></i>
  </button>
  <script>
    document.querySelectorAll('.category-pill').forEach(pill => {
      pill.addEventListener('click', () => {
        document.querySelectorAll('.category-pill').forEach(p => p.classList.remove('active'));
        pill.classList.add('active');
        const category = pill.getAttribute('data-category');
        document.querySelectorAll('.report-card').forEach(card => {
          const disabled = card.getAttribute('data-disabled') === 'true';
          const match = category === 'all' || card.getAttribute('data-categories').split(' ').includes(category);
          card.style.display = (match && !disabled) ? '' : 'none';
        });
      });
    });

    const themeToggle = document.getElementById('theme-toggle');
    const body = document.body;
    const icon = themeToggle.querySelector('i');
    if (localStorage.getItem('theme') === 'dark') {
      body.classList.add('dark-mode');
      icon.classList.replace('fa-moon', 'fa-sun');
    }
    themeToggle.addEventListener('click', () => {
      body.classList.toggle('dark-mode');
      const dark = body.classList.contains('dark-mode');
      icon.classList.replace(dark ? 'fa-moon' : 'fa-sun', dark ? 'fa-sun' : 'fa-moon');
      localStorage.setItem('theme', dark ? 'dark' : 'light');
    });

    document.querySelectorAll('.report-card[data-disabled="true"]').forEach(card => {
      card.style.display = 'none';
    });
  </script>
</body>
</html>
"#;
