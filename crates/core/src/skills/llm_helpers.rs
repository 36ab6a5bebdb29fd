//! # LLM Helpers
//!
//! Provider dispatch for radkit LLM calls. `with_llm!` builds the configured
//! provider client once; `run_llm_function!` and `run_llm_worker!` run a
//! structured function or a tool-using worker on top of it.
//!
//! The macros use `?` on provider construction, so the calling function must
//! return `anyhow::Result`.

/// Build the provider client named by a `ModelConfig` and evaluate `$body` with it.
#[macro_export]
macro_rules! with_llm {
    ($config:expr, |$llm:ident| $body:expr) => {{
        use radkit::models::providers::{
            AnthropicLlm, DeepSeekLlm, GeminiLlm, GrokLlm, OpenAILlm, OpenRouterLlm,
        };
        use $crate::models::LlmProvider;

        let config = $config;
        tracing::debug!(
            provider = config.provider.display_name(),
            model = %config.model,
            "Dispatching LLM call"
        );
        match config.provider {
            LlmProvider::Anthropic => {
                let $llm = AnthropicLlm::from_env(&config.model)?;
                $body
            }
            LlmProvider::OpenAI => {
                let $llm = match &config.base_url {
                    Some(base_url) => OpenAILlm::from_env(&config.model)?.with_base_url(base_url),
                    None => OpenAILlm::from_env(&config.model)?,
                };
                $body
            }
            LlmProvider::Gemini => {
                let $llm = GeminiLlm::from_env(&config.model)?;
                $body
            }
            LlmProvider::OpenRouter => {
                let $llm = OpenRouterLlm::from_env(&config.model)?;
                $body
            }
            LlmProvider::Grok => {
                let $llm = GrokLlm::from_env(&config.model)?;
                $body
            }
            LlmProvider::DeepSeek => {
                let $llm = DeepSeekLlm::from_env(&config.model)?;
                $body
            }
        }
    }};
}

/// Run an LlmFunction producing `$output_type` with any provider.
#[macro_export]
macro_rules! run_llm_function {
    ($config:expr, $output_type:ty, $system_prompt:expr, $input:expr) => {{
        let result: anyhow::Result<$output_type> = $crate::with_llm!($config, |llm| {
            radkit::agent::LlmFunction::<$output_type>::new_with_system_instructions(
                llm,
                $system_prompt,
            )
            .run($input)
            .await
            .map_err(Into::into)
        });
        result
    }};
}

/// Run an LlmWorker with tools, producing `$output_type`, with any provider.
#[macro_export]
macro_rules! run_llm_worker {
    ($config:expr, $output_type:ty, $system_prompt:expr, $input:expr, $($tool:expr),* $(,)?) => {{
        let result: anyhow::Result<$output_type> = $crate::with_llm!($config, |llm| {
            radkit::agent::LlmWorker::<$output_type>::builder(llm)
                .with_system_instructions($system_prompt)
                $(.with_tool($tool))*
                .build()
                .run($input)
                .await
                .map_err(Into::into)
        });
        result
    }};
}

pub use run_llm_function;
pub use run_llm_worker;
pub use with_llm;
