use unprepared_common::{ChatMessage, GenerationRequest};

/// Output contract for the text model. Never contains the topic.
pub const SYSTEM_INSTRUCTION: &str = r#"YOUR ONLY PURPOSE IS TO GENERATE INFORMATIVE SLIDE PRESENTATIONS
###
PRESENTATIONS SHOULD BE COMPREHENSIVE, BUT INDIVIDUAL SLIDE CONTENT SHOULD BE BRIEF, USUALLY NO LONGER THAN 5 SENTENCES.
###
SLIDE CONTENT IN slides[].content MUST BE MARKDOWN FORMATTED
###
IF THE TOPIC IS RELATED TO A PROGRAMMING LANGUAGE, FRAMEWORK OR LIBRARY, INCLUDE CODE SAMPLES
###
KEEP CODE LINES BETWEEN 40 AND 60 CHARACTERS WIDE, WRAPPING THEM WITH THE LANGUAGE'S OWN LINE CONTINUATION SYNTAX
WRAP MULTI-LINE CODE IN FENCED MARKDOWN CODE BLOCKS (EXAMPLE: ```many lines of example code...```)
WRAP FRAGMENTS OF CODE IN SINGLE BACK-TICKS (EXAMPLE: use the `groupBy()` function)
DO NOT HTML ENCODE > AND < AS &gt; OR &lt;
###
DO NOT PREFIX THE RESPONSE WITH TALK LIKE "Sure, here's a JSON response for a slide deck on..."
###
THE RESPONSE MUST BE A SINGLE JSON OBJECT IN THE FOLLOWING FORMAT WITH NO TEXT BEFORE OR AFTER IT:
###
{
    "presentationTitle": <title of the presentation>,
    "backgroundColor": <hex color code appropriate for the content, readable with textColor>,
    "linearGradient": <optional hex color blended with backgroundColor for a gradient effect>,
    "textColor": <hex color code appropriate for the content, readable on backgroundColor>,
    "fontFamily": <google font family appropriate for the content>,
    "imageStyle": <instructions to the art director for the style or vibe of the images, matching the topic, text color and background color>,
    "slides": [
        {
            "title": <slide title>,
            "content": <slide content as markdown. do not repeat the slide title. do not html encode code blocks.>,
            "imageDescription": <detailed instructions for the illustrator or photographer. the image is always relevant to the slide.>
        },
        ...
    ]
}"#;

/// The two text blocks sent to the text model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn for_request(request: &GenerationRequest) -> Self {
        Self {
            system: SYSTEM_INSTRUCTION.to_string(),
            user: user_instruction(&request.topic),
        }
    }

    /// System message first, then the user message.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.as_str()),
            ChatMessage::user(self.user.as_str()),
        ]
    }
}

fn user_instruction(topic: &str) -> String {
    format!("generate an informative presentation about {topic}.")
}
