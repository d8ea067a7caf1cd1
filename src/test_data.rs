#![cfg(test)]

use std::str::FromStr;

use crate::content::ContentRecord;
use crate::util::toml_date::TomlDate;

pub const CONFIG_DATA: &str = r##"
[site]
name = "Grizzly Agency"
base_url = "https://grizzly-agency.com/"
description = "Web development agency"
contact_inbox = "inbox@grizzly-agency.com"
contact_sender = "Grizzly Agency Contact <contact@grizzly-agency.com>"
newsletter_sender = "Grizzly Agency Newsletter <newsletter@grizzly-agency.com>"

[locales]
supported = ["en", "de"]
default = "en"

[paths]
blog_data = "data/blog.toml"
work_data = "data/work.toml"
public_dir = "public"

[server]
address = "127.0.0.1"
port = 8001
"##;

pub const BLOG_DATA: &str = r##"
[[records]]
id = "post-a"
slug = "post-a"
title = "Post A"
excerpt = "First post"
date = 2025-01-01
category = "Web Development"
tags = ["Next.js"]
author = "Alex Rivera"
image = "/public/blog/a.png"
read_time = "5 min read"

[[records]]
id = "post-b"
slug = "post-b"
title = "Post B <fast>"
excerpt = "Second post"
date = 2025-01-15
category = "Rust"
tags = ["Rust", "Web"]
author = "Sarah Chen"
image = "/public/blog/b.png"
read_time = "7 min read"
body = """
## Intro

Some *text*.
"""

[[records]]
id = "post-c"
slug = "post-c"
title = "Post C"
excerpt = "Third post"
date = "2024-12-28"
category = "Web Development"
author = "Michael Torres"
image = "/public/blog/c.png"
read_time = "3 min read"
"##;

pub const WORK_DATA: &str = r##"
[[records]]
id = "chantelle"
slug = "chantelle"
title = "Chantelle International"
excerpt = "Multi-regional e-commerce platform"
date = 2024-11-01
category = "E-commerce"
tags = ["Next.js", "TypeScript"]
author = "Grizzly Agency Team"
image = "/public/work/chantelle.jpeg"
read_time = "3 min read"

[records.project]
url = "https://chantelle.com/"
metrics = [
    { label = "Regions", value = "10+ Countries" },
]

[records.project.quote]
text = "Exceeded our expectations."
author = "Marie Dubois"
title = "Digital Director, Chantelle"
"##;

/// Minimal valid record: id equals slug, every display field filled.
pub fn record(slug: &str, date: &str, category: &str) -> ContentRecord {
    ContentRecord {
        id: slug.to_string(),
        slug: slug.to_string(),
        title: format!("Title of {}", slug),
        excerpt: format!("Excerpt of {}", slug),
        date: TomlDate::from_str(date).unwrap(),
        category: category.to_string(),
        tags: vec![],
        author: "Alex Rivera".to_string(),
        image: format!("/public/{}.png", slug),
        read_time: "5 min read".to_string(),
        body: None,
        project: None,
        body_html: None,
    }
}
