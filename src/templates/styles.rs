//! CSS for the reading tracker.

pub const STYLE: &str = r#"
/* Parchment theme */
:root {
    --parchment: #f5e9d8;
    --parchment-dark: #e0d0b8;
    --ink: #5a4132;
    --leather: #8b4513;
    --leather-dark: #654321;
    --tan: #d3b596;
    --tan-hover: #c4a585;
    --gray: #6b6b6b;
    --light-gray: #9b9b9b;
    --red: #c0392b;
    --green: #4a7a2c;

    --bg: var(--parchment);
    --fg: #333;
    --muted: var(--gray);
    --border: rgba(90, 65, 50, 0.2);
    --link: var(--leather);
    --link-hover: var(--leather-dark);
    --accent: var(--parchment-dark);
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
    line-height: 1.5;
    color: var(--fg);
    background: linear-gradient(180deg, var(--parchment) 0%, var(--parchment-dark) 100%);
    min-height: 100vh;
}

.container {
    max-width: 640px;
    margin: 0 auto;
    padding: 1rem;
}

a { color: var(--link); text-decoration: none; }
a:hover { color: var(--link-hover); text-decoration: underline; }

h1, h2, h3 { color: var(--ink); font-family: serif; }
h1 { font-size: 1.6rem; margin: 1rem 0; }
h3 { font-size: 0.95rem; font-family: inherit; margin-bottom: 0.25rem; }

.nav-bar {
    position: sticky;
    top: 0;
    background: var(--parchment);
    border-bottom: 1px solid var(--border);
    padding: 0.5rem 1rem;
    display: flex;
    gap: 1rem;
    align-items: center;
    z-index: 100;
}

.nav-bar .brand { font-family: serif; font-weight: bold; font-size: 1.2rem; color: var(--ink); }
.nav-bar .spacer { flex: 1; }

.search-box { display: flex; gap: 0.5rem; }

.search-box input {
    padding: 0.4rem 0.75rem;
    border: none;
    border-bottom: 2px solid var(--tan);
    background: transparent;
    color: var(--fg);
    font-size: 0.9rem;
    width: 160px;
}

.search-box button, .btn {
    padding: 0.4rem 0.9rem;
    border: none;
    border-radius: 4px;
    background: var(--tan);
    color: var(--ink);
    font-weight: bold;
    cursor: pointer;
    font-size: 0.9rem;
    font-family: inherit;
    text-decoration: none;
    display: inline-block;
    text-align: center;
}

.search-box button:hover, .btn:hover { background: var(--tan-hover); text-decoration: none; }
.btn.block { display: block; width: 100%; padding: 0.6rem 1rem; }
.btn.danger { background: rgba(192, 57, 43, 0.75); color: white; }
.btn.danger:hover { background: var(--red); }
.btn.secondary { background: #ccc; color: #333; }

.summary { font-size: 0.8rem; color: var(--muted); margin-bottom: 0.5rem; }

.chapter-list { list-style: none; }

.chapter-item {
    display: flex;
    justify-content: space-between;
    align-items: flex-start;
    gap: 0.5rem;
    padding: 0.4rem 0.5rem;
    border-bottom: 1px solid var(--border);
}

.chapter-item form { display: inline; }
.chapter-item .body { flex: 1; min-width: 0; display: flex; align-items: flex-start; gap: 0.6rem; }
.chapter-item .label { display: block; white-space: nowrap; overflow: hidden; text-overflow: ellipsis; color: #222; }
.chapter-item .notes-preview { display: block; font-size: 0.75rem; color: var(--muted); white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
.chapter-item .meta { font-size: 0.75rem; color: var(--light-gray); white-space: nowrap; margin-top: 0.2rem; }

.check {
    width: 1.4rem;
    height: 1.4rem;
    margin-top: 0.1rem;
    border: 2px solid var(--light-gray);
    border-radius: 4px;
    background: transparent;
    color: white;
    cursor: pointer;
    font-size: 0.8rem;
    line-height: 1;
}
.check:hover { border-color: var(--gray); }
.check.read { background: rgba(139, 69, 19, 0.7); border-color: var(--leather-dark); }

.panel {
    background: linear-gradient(135deg, var(--parchment) 0%, var(--parchment-dark) 100%);
    border-radius: 8px;
    box-shadow: 0 4px 16px rgba(0, 0, 0, 0.2);
    padding: 1.25rem;
    margin: 1.5rem auto;
    max-width: 28rem;
    display: flex;
    flex-direction: column;
    gap: 0.75rem;
}
.panel h2 { text-align: center; font-size: 1.5rem; }

.history { font-size: 0.75rem; color: var(--gray); max-height: 6rem; overflow-y: auto; }

.panel textarea {
    width: 100%;
    min-height: 5rem;
    padding: 0.5rem;
    border: 1px solid #ccc;
    border-radius: 4px;
    font-family: inherit;
    font-size: 0.9rem;
}

.confirm-box {
    padding: 0.75rem;
    background: #fdecea;
    border: 1px solid #f5b7b1;
    border-radius: 4px;
    text-align: center;
}
.confirm-box p { color: var(--red); font-size: 0.85rem; margin-bottom: 0.5rem; }
.confirm-box .actions { display: flex; justify-content: center; gap: 0.75rem; }

.login-form {
    max-width: 22rem;
    margin: 4rem auto;
    padding: 0 2rem;
    display: flex;
    flex-direction: column;
    align-items: center;
}

.login-form .title { font-family: serif; font-size: 2.8rem; font-weight: bold; color: var(--ink); margin-bottom: 2rem; }
.login-form .welcome { font-style: italic; color: #808080; margin-bottom: 2rem; }

.login-form input {
    width: 100%;
    padding: 0.5rem 0.75rem;
    margin-bottom: 1.5rem;
    border: none;
    border-bottom: 2px solid var(--tan);
    background: transparent;
    font-size: 1rem;
}

.login-form button {
    width: 100%;
    padding: 0.6rem;
    background: var(--tan);
    color: var(--ink);
    font-weight: bold;
    border: none;
    border-radius: 4px;
    font-size: 1rem;
    cursor: pointer;
    box-shadow: 0 2px 4px rgba(0, 0, 0, 0.2);
}

.login-form button:hover { background: var(--tan-hover); }

.message {
    padding: 0.75rem 1rem;
    border-radius: 4px;
    margin-bottom: 1rem;
}
.message.error { background: #fdf2f2; color: var(--red); border: 1px solid var(--red); }
.message.success { background: #f5f9f5; color: var(--green); border: 1px solid var(--green); }
"#;
