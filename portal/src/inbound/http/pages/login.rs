//! Login form.

use maud::{Markup, html};

use crate::domain::NEXT_PARAM;

use super::layout;

/// What the form shows: the return target, the identifier typed so far and
/// the last failure.
#[derive(Debug, Default)]
pub struct LoginForm<'a> {
    pub next: Option<&'a str>,
    pub email: &'a str,
    pub error: Option<&'a str>,
}

pub fn render(form: &LoginForm<'_>) -> Markup {
    layout::base(
        "Login",
        html! {
            main class="content" {
                div class="card login" {
                    h2 { "Login to Your Account" }
                    @if let Some(error) = form.error {
                        p class="error" role="alert" { (error) }
                    }
                    form method="post" action="/login" {
                        @if let Some(next) = form.next {
                            input type="hidden" name=(NEXT_PARAM) value=(next);
                        }
                        label {
                            "Email"
                            input type="email" name="email" value=(form.email)
                                placeholder="you@example.com";
                        }
                        label {
                            "Password"
                            input type="password" name="password";
                        }
                        button type="submit" { "Login" }
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn carries_the_return_target_and_escapes_input() {
        let page = render(&LoginForm {
            next: Some("/clients/7"),
            email: "<ada>",
            error: Some("Invalid credentials"),
        })
        .into_string();
        assert!(page.contains(r#"name="next" value="/clients/7""#));
        assert!(page.contains("&lt;ada&gt;"));
        assert!(page.contains("Invalid credentials"));
    }

    #[rstest]
    fn blank_form_has_no_error_or_target() {
        let page = render(&LoginForm::default()).into_string();
        assert!(!page.contains("role=\"alert\""));
        assert!(!page.contains("name=\"next\""));
    }
}
