use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::products::Product;

// ── Shared page shell ─────────────────────────────────────────────────────────

fn shell(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " — shop admin" }
                style { (PreEscaped(ADMIN_CSS)) }
            }
            body {
                (body)
            }
        }
    }
}

// ── Login page ────────────────────────────────────────────────────────────────

pub fn login_page(error: Option<&str>) -> Markup {
    shell(
        "Login",
        html! {
            div class="login-wrap" {
                div class="login-logo" { "shop" span { "·" } "admin" }
                p class="login-sub" { "Storefront administration" }
                form method="post" action="/adminF/login" class="login-form" {
                    @if let Some(err) = error {
                        p class="flash flash-err" { (err) }
                    }
                    div class="form-group" {
                        label for="password" { "Password" }
                        input type="password" id="password" name="password"
                            autocomplete="current-password" autofocus required;
                    }
                    button type="submit" { "Sign in" }
                }
            }
        },
    )
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

pub fn dashboard(products: &[Product], msg: Option<&str>, err: Option<&str>) -> Markup {
    shell(
        "Dashboard",
        html! {
            header class="topbar" {
                span class="topbar-title" { "shop" span { "·" } "admin" }
                nav {
                    a href="/" target="_blank" { "View shop" }
                    form method="post" action="/adminF/logout" class="inline-form" {
                        button type="submit" class="btn-quiet" { "Log out" }
                    }
                }
            }
            main class="admin-main" {
                @if let Some(m) = msg {
                    p class="flash flash-ok" { (m) }
                }
                @if let Some(e) = err {
                    p class="flash flash-err" { (e) }
                }

                section class="card" {
                    h2 { "Add a product" }
                    form method="post" action="/adminF/products"
                        enctype="multipart/form-data" class="product-form" {
                        div class="form-group" {
                            label for="new-description" { "Description" }
                            input type="text" id="new-description" name="description";
                        }
                        div class="form-group" {
                            label for="new-image" { "Image" }
                            input type="file" id="new-image" name="image" accept="image/*";
                        }
                        button type="submit" { "Add product" }
                    }
                }

                section class="card" {
                    h2 { "Products (" (products.len()) ")" }
                    @if products.is_empty() {
                        p class="empty" { "No products yet." }
                    }
                    ul class="product-list" {
                        @for product in products {
                            li class="product-row" {
                                @if let Some(img) = &product.image_path {
                                    img class="thumb" src=(img) alt=(product.description);
                                } @else {
                                    div class="thumb thumb-empty" { "—" }
                                }
                                form method="post"
                                    action={ "/adminF/products/" (product.id) }
                                    enctype="multipart/form-data" class="edit-form" {
                                    input type="text" name="description"
                                        value=(product.description)
                                        placeholder="Leave blank to keep";
                                    input type="file" name="image" accept="image/*";
                                    button type="submit" { "Save" }
                                }
                                form method="post"
                                    action={ "/adminF/products/" (product.id) "/delete" }
                                    class="inline-form" {
                                    button type="submit" class="btn-danger" { "Delete" }
                                }
                            }
                        }
                    }
                }

                section class="card" {
                    h2 { "Change admin password" }
                    form method="post" action="/adminF/password" class="product-form" {
                        div class="form-group" {
                            label for="new-password" { "New password" }
                            input type="password" id="new-password" name="newPassword"
                                autocomplete="new-password" required;
                        }
                        button type="submit" { "Update password" }
                    }
                }
            }
        },
    )
}

const ADMIN_CSS: &str = r#"
*, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }

:root {
  --bg:        #0d0f14;
  --surface:   #141720;
  --surface-2: #1b2030;
  --border:    #242a3d;
  --text:      #dde1ed;
  --muted:     #68718f;
  --accent:    #c9a84c;
  --accent-hi: #ddbf6a;
  --danger:    #e05555;
  --success:   #4caf82;
}

body {
  font-family: Georgia, serif;
  background: var(--bg);
  color: var(--text);
  min-height: 100vh;
  -webkit-font-smoothing: antialiased;
}

a { color: var(--accent); text-decoration: none; }
a:hover { color: var(--accent-hi); }

/* ── Login ── */
.login-wrap {
  max-width: 380px;
  margin: 12vh auto 0;
  padding: 2.5rem;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 14px;
}
.login-logo { font-size: 1.5rem; font-weight: 800; letter-spacing: -0.03em; }
.login-logo span { color: var(--accent); }
.login-sub { color: var(--muted); font-size: 0.8125rem; margin: 0.375rem 0 2rem; }
.login-form { display: flex; flex-direction: column; }

/* ── Forms ── */
.form-group { margin-bottom: 1rem; }
.form-group label {
  display: block;
  font-size: 0.75rem;
  color: var(--muted);
  margin-bottom: 0.375rem;
  text-transform: uppercase;
  letter-spacing: 0.06em;
}
input[type=text], input[type=password] {
  width: 100%;
  padding: 0.625rem 0.75rem;
  background: var(--surface-2);
  border: 1px solid var(--border);
  border-radius: 8px;
  color: var(--text);
  font: inherit;
}
input[type=file] { color: var(--muted); font-size: 0.8125rem; }
button {
  padding: 0.625rem 1rem;
  background: var(--accent);
  border: none;
  border-radius: 8px;
  color: var(--bg);
  font: inherit;
  font-weight: 600;
  cursor: pointer;
}
button:hover { background: var(--accent-hi); }
.btn-quiet { background: transparent; color: var(--muted); font-weight: 400; }
.btn-quiet:hover { background: var(--surface-2); color: var(--text); }
.btn-danger { background: transparent; color: var(--danger); border: 1px solid var(--danger); }
.btn-danger:hover { background: var(--danger); color: var(--bg); }

/* ── Layout ── */
.topbar {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 0.875rem 1.5rem;
  background: var(--surface);
  border-bottom: 1px solid var(--border);
}
.topbar-title { font-weight: 800; letter-spacing: -0.03em; }
.topbar-title span { color: var(--accent); }
.topbar nav { display: flex; align-items: center; gap: 1rem; }

.admin-main { max-width: 760px; margin: 0 auto; padding: 1.5rem; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 14px;
  padding: 1.5rem;
  margin-bottom: 1.5rem;
}
.card h2 { font-size: 1rem; margin-bottom: 1rem; }

.flash { padding: 0.625rem 0.875rem; border-radius: 8px; margin-bottom: 1rem; }
.flash-ok  { background: rgba(76,175,130,.12); color: var(--success); }
.flash-err { background: rgba(224,85,85,.12);  color: var(--danger); }

/* ── Product list ── */
.product-list { list-style: none; }
.product-row {
  display: flex;
  align-items: center;
  gap: 1rem;
  padding: 0.875rem 0;
  border-top: 1px solid var(--border);
}
.thumb {
  width: 56px;
  height: 42px;
  object-fit: cover;
  border-radius: 6px;
  flex-shrink: 0;
}
.thumb-empty {
  display: flex;
  align-items: center;
  justify-content: center;
  background: var(--surface-2);
  color: var(--muted);
}
.edit-form { display: flex; align-items: center; gap: 0.625rem; flex: 1; }
.edit-form input[type=text] { flex: 1; width: auto; }
.inline-form { display: inline; }

.empty { color: var(--muted); }
"#;
