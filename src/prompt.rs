//! Prompt composer
//!
//! Builds the single instruction block sent to the generation provider:
//! a fixed role/style preamble, the output-schema contract the extractor
//! relies on, and a task clause that branches on whether the user is
//! modifying an existing project or starting a new one.
//!
//! Deterministic for identical inputs: existing files are a BTreeMap so
//! their serialization order is stable, and nothing here does I/O.

use std::collections::BTreeMap;

/// Fixed preamble: role, response style, output schema, and template rules.
/// The JSON schema described here is what `extract::extract_files` expects
/// back, so the two must stay in sync.
const SYSTEM_RULES: &str = r##"You are an AI Assistant experienced in React Development.

GUIDELINES:
- Tell user what you are building.
- Response less than 15 lines.
- Skip code examples and commentary.

Generate a programming code structure for a React project using Vite. Create multiple components, organizing them in separate folders with filenames using the .js extension, if needed. The output should use Tailwind CSS for styling, without any third-party dependencies or libraries, except for icons from the lucide-react library, which should only be used when necessary. Available icons include: Heart, Shield, Clock, Users, Play, Home, Search, Menu, User, Settings, Mail, Bell, Calendar, Star, Upload, Download, Trash, Edit, Plus, Minus, Check, X, and ArrowRight. For example, you can import an icon as import { Heart } from "lucide-react" and use it in JSX as <Heart className="" />.

Return the response in JSON format with the following schema:
{
  "projectTitle": "",
  "explanation": "",
  "files": {
    "/App.js": {
      "code": ""
    },
    ...
  },
  "generatedFiles": []
}

Ensure the files field contains all created files, and the generatedFiles field lists all the filenames. Each file's code should be included in the code field, following this example:
files:{
  "/App.js": {
    "code": "import React from 'react';\nimport './styles.css';\nexport default function App() {\n  return (\n    <div className='p-4 bg-gray-100 text-center'>\n      <h1 className='text-2xl font-bold text-blue-500'>Hello, Tailwind CSS with Sandpack!</h1>\n      <p className='mt-2 text-gray-700'>This is a live code editor.</p>\n    </div>\n  );\n}"
  }
}
Additionally, include an explanation of the project's structure, purpose, and functionality in the explanation field. Make the response concise and clear in one paragraph.
- When asked then only use this package to import, here are some packages available to import and use (date-fns,react-chartjs-2,"firebase","@google/generative-ai" ) only when it required
- For placeholder images, please use a https://archive.org/download/placeholder-image/placeholder-image.jpg
- Add Emoji icons whenever needed to give good user experience
- all designs I ask you to make, have them be beautiful, not cookie cutter. Make webpages that are fully featured and worthy for production.
- By default, this template supports JSX syntax with Tailwind CSS classes, React hooks, and Lucide React for icons. Do not install other packages for UI themes, icons, etc unless absolutely necessary or I request them.
- Use icons from lucide-react for logos.
- Use stock photos from unsplash where appropriate, only valid URLs you know exist. Do not download the images, only link to them in image tags."##;

/// Build the full instruction text for one generation request
pub fn build_prompt(user_prompt: &str, existing_files: Option<&BTreeMap<String, String>>) -> String {
    let task = match existing_files {
        Some(files) => {
            // Keys are sorted by the BTreeMap, so the same file set always
            // serializes to the same text
            let serialized = serde_json::to_string_pretty(files)
                .unwrap_or_else(|_| "{}".to_string());
            format!(
                "Existing files to modify:\n{serialized}\n\n\
                 User request to modify the existing application: {user_prompt}\n\n\
                 Update the provided files according to the user's request. \
                 Preserve unchanged functionality and structure where possible, \
                 and only modify or add files as needed to implement the requested changes. \
                 Ensure the updated files form a complete, functional React application."
            )
        }
        None => format!(
            "User request: {user_prompt}\n\n\
             Generate a complete, functional React application with beautiful \
             styling and meaningful functionality."
        ),
    };

    format!("{SYSTEM_RULES}\n\n{task}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_prompt() {
        let prompt = build_prompt("todo app", None);
        assert!(prompt.starts_with("You are an AI Assistant"));
        assert!(prompt.contains("User request: todo app"));
        assert!(prompt.contains("Generate a complete, functional React application"));
        assert!(!prompt.contains("Existing files to modify"));
    }

    #[test]
    fn test_modify_project_prompt_embeds_files() {
        let mut files = BTreeMap::new();
        files.insert(
            "/App.js".to_string(),
            "export default function App() {}".to_string(),
        );

        let prompt = build_prompt("add a dark mode toggle", Some(&files));
        assert!(prompt.contains("Existing files to modify:"));
        assert!(prompt.contains("/App.js"));
        assert!(prompt.contains(
            "User request to modify the existing application: add a dark mode toggle"
        ));
        assert!(prompt.contains("Preserve unchanged functionality"));
    }

    #[test]
    fn test_prompt_describes_output_schema() {
        // The extractor depends on this contract being in every prompt
        let prompt = build_prompt("anything", None);
        assert!(prompt.contains("\"files\""));
        assert!(prompt.contains("\"code\""));
        assert!(prompt.contains("/App.js"));
    }

    #[test]
    fn test_deterministic_for_identical_inputs() {
        let mut files = BTreeMap::new();
        files.insert("/b.js".to_string(), "b".to_string());
        files.insert("/a.js".to_string(), "a".to_string());

        let first = build_prompt("same", Some(&files));
        let second = build_prompt("same", Some(&files));
        assert_eq!(first, second);
    }
}
