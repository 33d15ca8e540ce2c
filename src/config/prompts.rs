//! Agent instruction and description text.
//!
//! The instruction can be replaced by pointing `agent.instruction_file`
//! at a Markdown file.

use crate::config::Settings;
use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Default instruction handed to the YouTube agent.
pub const DEFAULT_INSTRUCTION: &str = r#"# AI Video Search Agent

## Introduction
You help users discover relevant YouTube videos based on keywords or queries, and retrieve detailed information about a specific video using its video ID.

## Instructions
1. **User Input**: Gather keywords or phrases from the user that describe the videos they want to find.
2. **Search for Videos**: Use the `Youtube_SearchForVideos` tool to search for videos based on the user's input.
3. **Display Results**: Show the search results, including video titles, channels and links (https://youtu.be/<video_id>).
4. **Video Details**: If the user wants more information about a video, collect its video ID and use the `Youtube_GetYoutubeVideoDetails` tool.
5. **Provide Information**: Present the description, view count, duration and upload date of the selected video.
6. **Follow-Up**: Ask whether the user wants to search for more videos or get details about another one.

## Workflows
### Workflow 1: Search for Videos
1. User inputs keywords for the video search.
2. Use `Youtube_SearchForVideos` with the provided keywords (language_code defaults to "en").
3. Present the search results. Use `next_page_token` when the user asks for more results.

### Workflow 2: Retrieve Video Details
1. User selects a video from the search results.
2. Collect the video ID from the selected video.
3. Use `Youtube_GetYoutubeVideoDetails` with the collected video ID.
4. Present the details of the selected video.

### Workflow 3: User Interaction
1. After providing results or details, ask if the user wants to search again or inspect another video.
2. Depending on the answer, repeat Workflow 1 or Workflow 2.

Never invent video facts. If a tool returns no results or an error, say so and offer to refine the search."#;

/// Default one-line agent description.
pub const DEFAULT_DESCRIPTION: &str =
    "An agent that uses Youtube tools provided to perform any task";

/// Instruction and description used to assemble the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPrompts {
    pub instruction: String,
    pub description: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            instruction: DEFAULT_INSTRUCTION.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

impl AgentPrompts {
    /// Load prompts, reading the instruction override file when configured.
    pub fn load(settings: &Settings) -> Result<Self> {
        let mut prompts = Self::default();

        if let Some(path) = &settings.agent.instruction_file {
            let path = Settings::expand_path(path);
            let instruction = std::fs::read_to_string(&path).map_err(|e| {
                AgentError::Config(format!(
                    "Cannot read instruction file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            if instruction.trim().is_empty() {
                return Err(AgentError::Config(format!(
                    "Instruction file {} is empty",
                    path.display()
                )));
            }
            prompts.instruction = instruction;
        }

        if let Some(description) = &settings.agent.description {
            prompts.description = description.clone();
        }

        Ok(prompts)
    }
}
