//! Built-in events used when no events have been stored yet

use chrono::NaiveDate;

use crate::models::Event;

fn seed_event(
    id: &str,
    name: &str,
    description: &str,
    location: &str,
    (year, month, day): (i32, u32, u32),
    time: &str,
    fees: f64,
) -> Option<Event> {
    Some(Event {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        location: location.to_string(),
        date: NaiveDate::from_ymd_opt(year, month, day)?,
        time: time.to_string(),
        fees,
    })
}

pub fn seed_events() -> Vec<Event> {
    [
        seed_event(
            "1",
            "Tech Innovation Summit 2025",
            "Join industry leaders for a day of innovation, networking, and inspiration. Learn about the latest trends in technology and connect with fellow professionals.",
            "Grand Convention Center, Hall A",
            (2025, 11, 15),
            "09:00 AM",
            1500.0,
        ),
        seed_event(
            "2",
            "Cultural Fest - Harmony",
            "Experience diverse cultural performances, food stalls, and interactive workshops celebrating unity in diversity.",
            "University Main Auditorium",
            (2025, 11, 20),
            "05:00 PM",
            500.0,
        ),
        seed_event(
            "3",
            "Hackathon 48: Code for Change",
            "48-hour coding marathon to build innovative solutions for real-world problems. Prizes worth ₹50,000 up for grabs!",
            "Innovation Hub, IT Block",
            (2025, 12, 1),
            "10:00 AM",
            800.0,
        ),
        seed_event(
            "4",
            "Workshop: AI & Machine Learning",
            "Hands-on workshop covering fundamentals of AI/ML with practical implementation using Python and TensorFlow.",
            "Computer Lab 3, Building B",
            (2025, 11, 25),
            "02:00 PM",
            600.0,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
}
