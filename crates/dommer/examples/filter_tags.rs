//! Filter example - find the anchors in a list and keep the tagged ones

use dom::Document;
use dommer::Dommer;
use std::time::Instant;

const PAGE: &str = r#"
<ul>
  <li><a class="tag" href="/rust">rust</a></li>
  <li><a href="/about">about</a></li>
  <li>
    <a class="tag" href="/dom">dom</a>
    <ul><li><a data-label="link3.2.3" href="/nested">nested</a></li></ul>
  </li>
</ul>
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let doc = Document::parse_html(PAGE)?;
    let list = Dommer::select(&doc, "ul")?.first();
    let anchors = list.find(&doc, "a")?;

    let started = Instant::now();
    let tags = anchors.filter(&doc, ".tag");
    println!("perf: {:?}", started.elapsed());

    for node_id in &tags {
        println!("{}", doc.outer_html(node_id)?);
    }

    let labelled = list.find(&doc, "[data-label]")?;
    println!("labelled: {:?}", labelled.html(&doc)?);

    Ok(())
}
