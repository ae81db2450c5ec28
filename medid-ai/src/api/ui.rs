//! UI Routes - upload page for the medid web interface
//!
//! Vanilla HTML/JS: pick images, post them to `/identify/`, show the JSON.

use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::AppState;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new().route("/", get(root_page))
}

/// Root page - Medicine Identification
async fn root_page() -> impl IntoResponse {
    Html(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Medicine Identification App</title>
    <style>
        body {
            font-family: system-ui, -apple-system, sans-serif;
            max-width: 800px;
            margin: 40px auto;
            padding: 20px;
            line-height: 1.6;
        }
        h1 {
            color: #333;
            border-bottom: 2px solid #0066cc;
            padding-bottom: 10px;
        }
        .button {
            display: inline-block;
            padding: 10px 20px;
            background: #0066cc;
            color: white;
            border: none;
            border-radius: 4px;
            margin: 10px 0;
            cursor: pointer;
        }
        .button:hover {
            background: #0052a3;
        }
        .button:disabled {
            background: #999;
            cursor: wait;
        }
        #result {
            background: #f5f5f5;
            padding: 20px;
            border-radius: 4px;
            white-space: pre-wrap;
        }
        .error {
            color: #b00020;
        }
    </style>
</head>
<body>
    <h1>Medicine Identification App</h1>

    <form id="upload-form">
        <label for="files">Upload medicine images</label><br>
        <input type="file" id="files" name="files" accept=".jpg,.jpeg,.png,.webp" multiple>
        <br>
        <button type="submit" class="button" id="identify">Identify Medicine</button>
    </form>

    <pre id="result" hidden></pre>
    <p id="failure" class="error" hidden>Failed to identify medicine.</p>

    <script>
        const form = document.getElementById('upload-form');
        const button = document.getElementById('identify');
        const result = document.getElementById('result');
        const failure = document.getElementById('failure');

        form.addEventListener('submit', async (event) => {
            event.preventDefault();
            result.hidden = true;
            failure.hidden = true;

            const files = document.getElementById('files').files;
            if (files.length === 0) {
                return;
            }

            const body = new FormData();
            for (const file of files) {
                body.append('files', file, file.name);
            }

            button.disabled = true;
            try {
                const response = await fetch('/identify/', { method: 'POST', body });
                if (!response.ok) {
                    failure.hidden = false;
                    return;
                }
                result.textContent = JSON.stringify(await response.json(), null, 2);
                result.hidden = false;
            } catch (err) {
                failure.hidden = false;
            } finally {
                button.disabled = false;
            }
        });
    </script>

    <p><small>Module: medid-ai | POST /identify/ | GET /health</small></p>
</body>
</html>
        "#,
    )
}
