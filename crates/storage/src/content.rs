use anyhow::{Context, Result};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection};

use shared::{
    domain::{
        About, Call, ClassListing, ClassOffering, Contacts, Facilities, FacilityColumn,
        GalleryImage, Headlines, Record, Schedule, Slide, TeamId, TeamMember, Testimonial,
    },
    seed::SiteSeed,
};

use crate::Storage;

const TEAM_COLUMNS: &str = "id, name, profession, position, is_visible, image, description, \
    image_class, twitter_url, facebook_url, instagram_url";
const SLIDER_COLUMNS: &str = "id, title, position, image, is_visible, heading, description, \
    button_1, button_1_url, button_2, button_2_url";
const ABOUT_COLUMNS: &str = "id, heading, description, button, founder_name, founder_position, \
    founder_image, is_visible, image_1, image_2, image_3";
const TESTIMONIAL_COLUMNS: &str = "id, name, profession, position, is_visible, image, description";
const FACILITIES_COLUMNS: &str = "id, heading_1, desc_1, heading_2, desc_2, heading_3, desc_3, \
    heading_4, desc_4, position, is_visible";
const CALL_COLUMNS: &str = "id, title, description, image, position, is_visible, button, button_url";
const GALLERY_COLUMNS: &str = "id, image, position, is_visible";
const CONTACTS_COLUMNS: &str = "id, heading, address, phone, email, twitter_url, facebook_url, \
    youtube_url, linkedin_url";
const SCHEDULE_COLUMNS: &str = "id, title, description, image, position, is_visible";
const HEADLINES_COLUMNS: &str = "id, title_facilities, desc_facilities, title_classes, \
    desc_classes, title_teachers, desc_teachers, title_testimonial, desc_testimonial";

/// Row counts written by [`Storage::apply_seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub team: usize,
    pub slides: usize,
    pub testimonials: usize,
    pub classes: usize,
    pub gallery: usize,
    pub singletons: usize,
}

impl Storage {
    /// Inserts everything in `seed` in one transaction: either the whole
    /// document is stored or nothing is.
    pub async fn apply_seed(&self, seed: &SiteSeed) -> Result<SeedReport> {
        let mut tx = self.pool.begin().await?;
        match write_seed(&mut tx, seed).await {
            Ok(report) => {
                tx.commit().await?;
                Ok(report)
            }
            Err(err) => {
                tx.rollback().await?;
                Err(err)
            }
        }
    }

    pub async fn insert_team_member(&self, member: &TeamMember) -> Result<TeamId> {
        let mut conn = self.pool.acquire().await?;
        write_team_member(&mut conn, member).await
    }

    /// Visible team members in display order, at most `limit` of them.
    pub async fn list_team(&self, limit: u32) -> Result<Vec<Record<TeamMember>>> {
        let rows = sqlx::query(&format!(
            "SELECT {TEAM_COLUMNS} FROM team WHERE is_visible = 1 ORDER BY position ASC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|r| team_member_from_row(r, "")).collect())
    }

    pub async fn insert_slide(&self, slide: &Slide) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        write_slide(&mut conn, slide).await
    }

    pub async fn list_visible_slides(&self) -> Result<Vec<Record<Slide>>> {
        let rows = sqlx::query(&format!(
            "SELECT {SLIDER_COLUMNS} FROM slider WHERE is_visible = 1 ORDER BY position ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Record {
                id: r.get("id"),
                fields: Slide {
                    title: r.get("title"),
                    position: r.get("position"),
                    image: r.get("image"),
                    is_visible: r.get("is_visible"),
                    heading: r.get("heading"),
                    desc: r.get("description"),
                    button_1: r.get("button_1"),
                    button_1_url: r.get("button_1_url"),
                    button_2: r.get("button_2"),
                    button_2_url: r.get("button_2_url"),
                },
            })
            .collect())
    }

    pub async fn about(&self) -> Result<Record<About>> {
        let r = self.singleton_row("about", ABOUT_COLUMNS).await?;
        Ok(Record {
            id: r.get("id"),
            fields: About {
                heading: r.get("heading"),
                desc: r.get("description"),
                button: r.get("button"),
                founder_name: r.get("founder_name"),
                founder_position: r.get("founder_position"),
                founder_image: r.get("founder_image"),
                is_visible: r.get("is_visible"),
                image_1: r.get("image_1"),
                image_2: r.get("image_2"),
                image_3: r.get("image_3"),
            },
        })
    }

    pub async fn list_visible_testimonials(&self) -> Result<Vec<Record<Testimonial>>> {
        let rows = sqlx::query(&format!(
            "SELECT {TESTIMONIAL_COLUMNS} FROM testimonials WHERE is_visible = 1 ORDER BY position ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Record {
                id: r.get("id"),
                fields: Testimonial {
                    name: r.get("name"),
                    profession: r.get("profession"),
                    position: r.get("position"),
                    is_visible: r.get("is_visible"),
                    image: r.get("image"),
                    desc: r.get("description"),
                },
            })
            .collect())
    }

    pub async fn insert_class(&self, class: &ClassOffering) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        write_class(&mut conn, class).await
    }

    /// Visible classes with their teachers, in display order.
    pub async fn list_classes(&self) -> Result<Vec<ClassListing>> {
        self.query_classes("ORDER BY c.position ASC", None).await
    }

    /// A random pick of at most `limit` visible classes.
    pub async fn sample_classes(&self, limit: u32) -> Result<Vec<ClassListing>> {
        self.query_classes("ORDER BY RANDOM()", Some(limit)).await
    }

    async fn query_classes(&self, order: &str, limit: Option<u32>) -> Result<Vec<ClassListing>> {
        let sql = format!(
            "SELECT c.id, c.title, c.price_cents, c.image, c.position, c.is_visible, c.teacher_id,
                    c.age, c.time, c.capacity,
                    t.id AS t_id, t.name AS t_name, t.profession AS t_profession,
                    t.position AS t_position, t.is_visible AS t_is_visible, t.image AS t_image,
                    t.description AS t_description, t.image_class AS t_image_class,
                    t.twitter_url AS t_twitter_url, t.facebook_url AS t_facebook_url,
                    t.instagram_url AS t_instagram_url
             FROM classes c
             INNER JOIN team t ON t.id = c.teacher_id
             WHERE c.is_visible = 1
             {order}
             LIMIT ?"
        );
        let rows = sqlx::query(&sql)
            .bind(limit.map_or(-1, i64::from))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|r| {
                let class = ClassOffering {
                    title: r.get("title"),
                    price_cents: r.get("price_cents"),
                    image: r.get("image"),
                    position: r.get("position"),
                    is_visible: r.get("is_visible"),
                    teacher_id: TeamId(r.get("teacher_id")),
                    age: r.get("age"),
                    time: r.get("time"),
                    capacity: r.get("capacity"),
                };
                ClassListing {
                    price: class.price_display(),
                    class: Record {
                        id: r.get("id"),
                        fields: class,
                    },
                    teacher: team_member_from_row(r, "t_"),
                }
            })
            .collect())
    }

    pub async fn facilities(&self) -> Result<Record<Facilities>> {
        let r = self.singleton_row("facilities", FACILITIES_COLUMNS).await?;
        let column = |n: u8| FacilityColumn {
            heading: r.get(format!("heading_{n}").as_str()),
            desc: r.get(format!("desc_{n}").as_str()),
        };
        Ok(Record {
            id: r.get("id"),
            fields: Facilities {
                columns: [column(1), column(2), column(3), column(4)],
                position: r.get("position"),
                is_visible: r.get("is_visible"),
            },
        })
    }

    pub async fn call(&self) -> Result<Record<Call>> {
        let r = self.singleton_row("calls", CALL_COLUMNS).await?;
        Ok(Record {
            id: r.get("id"),
            fields: Call {
                title: r.get("title"),
                desc: r.get("description"),
                image: r.get("image"),
                position: r.get("position"),
                is_visible: r.get("is_visible"),
                button: r.get("button"),
                button_url: r.get("button_url"),
            },
        })
    }

    pub async fn insert_gallery_image(&self, image: &GalleryImage) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        write_gallery_image(&mut conn, image).await
    }

    /// A random pick of at most `limit` visible gallery images.
    pub async fn sample_gallery(&self, limit: u32) -> Result<Vec<Record<GalleryImage>>> {
        let rows = sqlx::query(&format!(
            "SELECT {GALLERY_COLUMNS} FROM gallery WHERE is_visible = 1 ORDER BY RANDOM() LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| Record {
                id: r.get("id"),
                fields: GalleryImage {
                    image: r.get("image"),
                    position: r.get("position"),
                    is_visible: r.get("is_visible"),
                },
            })
            .collect())
    }

    pub async fn contacts(&self) -> Result<Record<Contacts>> {
        let r = self.singleton_row("contacts", CONTACTS_COLUMNS).await?;
        Ok(Record {
            id: r.get("id"),
            fields: Contacts {
                heading: r.get("heading"),
                address: r.get("address"),
                phone: r.get("phone"),
                email: r.get("email"),
                twitter_url: r.get("twitter_url"),
                facebook_url: r.get("facebook_url"),
                youtube_url: r.get("youtube_url"),
                linkedin_url: r.get("linkedin_url"),
            },
        })
    }

    pub async fn schedule(&self) -> Result<Record<Schedule>> {
        let r = self.singleton_row("schedules", SCHEDULE_COLUMNS).await?;
        Ok(Record {
            id: r.get("id"),
            fields: Schedule {
                title: r.get("title"),
                desc: r.get("description"),
                image: r.get("image"),
                position: r.get("position"),
                is_visible: r.get("is_visible"),
            },
        })
    }

    pub async fn insert_headlines(&self, headlines: &Headlines) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        write_headlines(&mut conn, headlines).await
    }

    pub async fn headlines(&self) -> Result<Record<Headlines>> {
        let r = self.singleton_row("headlines", HEADLINES_COLUMNS).await?;
        Ok(Record {
            id: r.get("id"),
            fields: Headlines {
                title_facilities: r.get("title_facilities"),
                desc_facilities: r.get("desc_facilities"),
                title_classes: r.get("title_classes"),
                desc_classes: r.get("desc_classes"),
                title_teachers: r.get("title_teachers"),
                desc_teachers: r.get("desc_teachers"),
                title_testimonial: r.get("title_testimonial"),
                desc_testimonial: r.get("desc_testimonial"),
            },
        })
    }
}

/// Team members go first so classes can resolve their teacher by position,
/// including teachers seeded earlier.
async fn write_seed(conn: &mut SqliteConnection, seed: &SiteSeed) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for member in &seed.team {
        write_team_member(&mut *conn, member).await?;
        report.team += 1;
    }
    for slide in &seed.slider {
        write_slide(&mut *conn, slide).await?;
        report.slides += 1;
    }
    for testimonial in &seed.testimonials {
        write_testimonial(&mut *conn, testimonial).await?;
        report.testimonials += 1;
    }
    for class in &seed.classes {
        let teacher_id = team_id_at(&mut *conn, class.teacher_position)
            .await?
            .with_context(|| {
                format!(
                    "class '{}' names teacher position {}, which has no team member",
                    class.title, class.teacher_position
                )
            })?;
        write_class(&mut *conn, &class.clone().into_offering(teacher_id)).await?;
        report.classes += 1;
    }
    for image in &seed.gallery {
        write_gallery_image(&mut *conn, image).await?;
        report.gallery += 1;
    }

    if let Some(about) = &seed.about {
        write_about(&mut *conn, about).await?;
        report.singletons += 1;
    }
    if let Some(facilities) = &seed.facilities {
        write_facilities(&mut *conn, facilities).await?;
        report.singletons += 1;
    }
    if let Some(call) = &seed.call {
        write_call(&mut *conn, call).await?;
        report.singletons += 1;
    }
    if let Some(contacts) = &seed.contacts {
        write_contacts(&mut *conn, contacts).await?;
        report.singletons += 1;
    }
    if let Some(schedule) = &seed.schedule {
        write_schedule(&mut *conn, schedule).await?;
        report.singletons += 1;
    }
    if let Some(headlines) = &seed.headlines {
        write_headlines(&mut *conn, headlines).await?;
        report.singletons += 1;
    }

    Ok(report)
}

async fn write_team_member(conn: &mut SqliteConnection, member: &TeamMember) -> Result<TeamId> {
    let rec = sqlx::query(
        "INSERT INTO team (name, profession, position, is_visible, image, description, image_class, twitter_url, facebook_url, instagram_url)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&member.name)
    .bind(&member.profession)
    .bind(member.position)
    .bind(member.is_visible)
    .bind(member.image.as_deref())
    .bind(&member.desc)
    .bind(member.image_class.as_deref())
    .bind(&member.twitter_url)
    .bind(&member.facebook_url)
    .bind(&member.instagram_url)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("failed to insert team member at position {}", member.position))?;
    Ok(TeamId(rec.get::<i64, _>(0)))
}

async fn team_id_at(conn: &mut SqliteConnection, position: i64) -> Result<Option<TeamId>> {
    let row = sqlx::query("SELECT id FROM team WHERE position = ?")
        .bind(position)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.map(|r| TeamId(r.get::<i64, _>(0))))
}

async fn write_slide(conn: &mut SqliteConnection, slide: &Slide) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO slider (title, position, image, is_visible, heading, description, button_1, button_1_url, button_2, button_2_url)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&slide.title)
    .bind(slide.position)
    .bind(&slide.image)
    .bind(slide.is_visible)
    .bind(&slide.heading)
    .bind(&slide.desc)
    .bind(&slide.button_1)
    .bind(&slide.button_1_url)
    .bind(&slide.button_2)
    .bind(&slide.button_2_url)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("failed to insert slide at position {}", slide.position))?;
    Ok(rec.get::<i64, _>(0))
}

async fn write_about(conn: &mut SqliteConnection, about: &About) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO about (heading, description, button, founder_name, founder_position, founder_image, is_visible, image_1, image_2, image_3)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&about.heading)
    .bind(&about.desc)
    .bind(&about.button)
    .bind(&about.founder_name)
    .bind(&about.founder_position)
    .bind(&about.founder_image)
    .bind(about.is_visible)
    .bind(&about.image_1)
    .bind(&about.image_2)
    .bind(&about.image_3)
    .fetch_one(&mut *conn)
    .await?;
    Ok(rec.get::<i64, _>(0))
}

async fn write_testimonial(conn: &mut SqliteConnection, testimonial: &Testimonial) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO testimonials (name, profession, position, is_visible, image, description)
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&testimonial.name)
    .bind(&testimonial.profession)
    .bind(testimonial.position)
    .bind(testimonial.is_visible)
    .bind(testimonial.image.as_deref())
    .bind(&testimonial.desc)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| {
        format!(
            "failed to insert testimonial at position {}",
            testimonial.position
        )
    })?;
    Ok(rec.get::<i64, _>(0))
}

async fn write_class(conn: &mut SqliteConnection, class: &ClassOffering) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO classes (title, price_cents, image, position, is_visible, teacher_id, age, time, capacity)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&class.title)
    .bind(class.price_cents)
    .bind(class.image.as_deref())
    .bind(class.position)
    .bind(class.is_visible)
    .bind(class.teacher_id.0)
    .bind(&class.age)
    .bind(&class.time)
    .bind(&class.capacity)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("failed to insert class at position {}", class.position))?;
    Ok(rec.get::<i64, _>(0))
}

async fn write_facilities(conn: &mut SqliteConnection, facilities: &Facilities) -> Result<i64> {
    let [c1, c2, c3, c4] = &facilities.columns;
    let rec = sqlx::query(
        "INSERT INTO facilities (heading_1, desc_1, heading_2, desc_2, heading_3, desc_3, heading_4, desc_4, position, is_visible)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&c1.heading)
    .bind(&c1.desc)
    .bind(&c2.heading)
    .bind(&c2.desc)
    .bind(&c3.heading)
    .bind(&c3.desc)
    .bind(&c4.heading)
    .bind(&c4.desc)
    .bind(facilities.position)
    .bind(facilities.is_visible)
    .fetch_one(&mut *conn)
    .await?;
    Ok(rec.get::<i64, _>(0))
}

async fn write_call(conn: &mut SqliteConnection, call: &Call) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO calls (title, description, image, position, is_visible, button, button_url)
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&call.title)
    .bind(&call.desc)
    .bind(call.image.as_deref())
    .bind(call.position)
    .bind(call.is_visible)
    .bind(&call.button)
    .bind(&call.button_url)
    .fetch_one(&mut *conn)
    .await?;
    Ok(rec.get::<i64, _>(0))
}

async fn write_gallery_image(conn: &mut SqliteConnection, image: &GalleryImage) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO gallery (image, position, is_visible) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(image.image.as_deref())
    .bind(image.position)
    .bind(image.is_visible)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("failed to insert gallery image at position {}", image.position))?;
    Ok(rec.get::<i64, _>(0))
}

async fn write_contacts(conn: &mut SqliteConnection, contacts: &Contacts) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO contacts (heading, address, phone, email, twitter_url, facebook_url, youtube_url, linkedin_url)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&contacts.heading)
    .bind(&contacts.address)
    .bind(&contacts.phone)
    .bind(&contacts.email)
    .bind(&contacts.twitter_url)
    .bind(&contacts.facebook_url)
    .bind(&contacts.youtube_url)
    .bind(&contacts.linkedin_url)
    .fetch_one(&mut *conn)
    .await?;
    Ok(rec.get::<i64, _>(0))
}

async fn write_schedule(conn: &mut SqliteConnection, schedule: &Schedule) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO schedules (title, description, image, position, is_visible)
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&schedule.title)
    .bind(&schedule.desc)
    .bind(schedule.image.as_deref())
    .bind(schedule.position)
    .bind(schedule.is_visible)
    .fetch_one(&mut *conn)
    .await?;
    Ok(rec.get::<i64, _>(0))
}

async fn write_headlines(conn: &mut SqliteConnection, headlines: &Headlines) -> Result<i64> {
    let rec = sqlx::query(
        "INSERT INTO headlines (title_facilities, desc_facilities, title_classes, desc_classes, title_teachers, desc_teachers, title_testimonial, desc_testimonial)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&headlines.title_facilities)
    .bind(&headlines.desc_facilities)
    .bind(&headlines.title_classes)
    .bind(&headlines.desc_classes)
    .bind(&headlines.title_teachers)
    .bind(&headlines.desc_teachers)
    .bind(&headlines.title_testimonial)
    .bind(&headlines.desc_testimonial)
    .fetch_one(&mut *conn)
    .await?;
    Ok(rec.get::<i64, _>(0))
}

fn team_member_from_row(r: &SqliteRow, prefix: &str) -> Record<TeamMember> {
    let col = |name: &str| format!("{prefix}{name}");
    Record {
        id: r.get(col("id").as_str()),
        fields: TeamMember {
            name: r.get(col("name").as_str()),
            profession: r.get(col("profession").as_str()),
            position: r.get(col("position").as_str()),
            is_visible: r.get(col("is_visible").as_str()),
            image: r.get(col("image").as_str()),
            desc: r.get(col("description").as_str()),
            image_class: r.get(col("image_class").as_str()),
            twitter_url: r.get(col("twitter_url").as_str()),
            facebook_url: r.get(col("facebook_url").as_str()),
            instagram_url: r.get(col("instagram_url").as_str()),
        },
    }
}
