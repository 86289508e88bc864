//! Reply composition. Pure string assembly so the exact output is easy to
//! pin down in tests: header, one bullet per (url, snapshot) pair in
//! extraction order, the album bullet, then the fixed footer.

pub const REPLY_HEADER: &str = "The following URLs have been snapshotted:\n\n";

const REPLY_FOOTER: &str = "\n\n____\n\n\
    `To snapshot URLs, add '/u/snapshot_bot' to your comment.`\n\n\
    `For more information go to:` [r/snapshot_bot](http://reddit.com/r/snapshot_bot).\n\n\
    `Snapshots by /u/snapshot_bot.`";

/// Build the reply body. `urls` and `image_links` correlate by position.
pub fn compose_reply(urls: &[String], image_links: &[String], album_link: &str) -> String {
    let mut reply = String::from(REPLY_HEADER);

    for (url, link) in urls.iter().zip(image_links) {
        reply.push_str(&format!("* {url} - [[snapshot]({link})]\n\n"));
    }

    reply.push_str(&format!("* [Snapshot Album]({album_link})\n\n"));
    reply.push_str(REPLY_FOOTER);
    reply
}
