use anyhow::Context;
use minijinja::{context, Environment};
use sotd_core::domain::recommendation::Recommendation;

/// Shown for every pipeline failure; internals stay in the server log.
pub const GENERIC_FAILURE: &str = "Failed to generate stock recommendation";

pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn load() -> anyhow::Result<Self> {
        let mut env = Environment::new();
        env.add_template("index.html", include_str!("../templates/index.html"))
            .context("index.html template is invalid")?;
        env.add_template("stock.html", include_str!("../templates/stock.html"))
            .context("stock.html template is invalid")?;
        env.add_template("error.html", include_str!("../templates/error.html"))
            .context("error.html template is invalid")?;
        Ok(Self { env })
    }

    pub fn index(&self) -> anyhow::Result<String> {
        self.render("index.html", context! {})
    }

    pub fn stock(&self, rec: &Recommendation) -> anyhow::Result<String> {
        self.render(
            "stock.html",
            context! {
                symbol => rec.symbol.as_str(),
                ai_pick => rec.render_text(),
                generated_at => rec.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            },
        )
    }

    pub fn error(&self, message: &str) -> anyhow::Result<String> {
        self.render("error.html", context! { message => message })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> anyhow::Result<String> {
        self.env
            .get_template(name)
            .with_context(|| format!("missing template {name}"))?
            .render(ctx)
            .with_context(|| format!("failed to render {name}"))
    }
}
