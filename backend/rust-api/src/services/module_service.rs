use anyhow::{anyhow, Context, Result};
use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::Database;

use crate::models::module::{
    CreateModuleRequest, LearningModule, ModuleSection, ProgressOutcome, ProgressRequest,
    QuizQuestion, UpdateModuleRequest,
};
use crate::models::user::{ModuleProgress, User};

pub struct ModuleService {
    mongo: Database,
}

impl ModuleService {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    /// List active modules, seeding the built-in defaults when the collection
    /// has never been populated.
    pub async fn list_active(&self) -> Result<Vec<LearningModule>> {
        let collection = self.mongo.collection::<LearningModule>("modules");

        let total = collection
            .count_documents(doc! {})
            .await
            .context("Failed to count modules")?;

        if total == 0 {
            tracing::info!("Modules collection is empty, seeding default learning modules");
            collection
                .insert_many(default_modules())
                .await
                .context("Failed to seed default modules")?;
        }

        let mut cursor = collection
            .find(doc! { "isActive": true })
            .sort(doc! { "createdAt": 1 })
            .await
            .context("Failed to query modules")?;

        let mut modules = Vec::new();
        while let Some(module) = cursor
            .try_next()
            .await
            .context("Failed to read module from cursor")?
        {
            modules.push(module);
        }

        Ok(modules)
    }

    pub async fn get(&self, module_id: &str) -> Result<LearningModule> {
        let object_id = ObjectId::parse_str(module_id).context("Invalid module ID format")?;

        let collection = self.mongo.collection::<LearningModule>("modules");
        collection
            .find_one(doc! { "_id": object_id })
            .await
            .context("Failed to query module")?
            .ok_or_else(|| anyhow!("Module not found"))
    }

    pub async fn create(&self, req: CreateModuleRequest) -> Result<LearningModule> {
        let collection = self.mongo.collection::<LearningModule>("modules");

        let now = bson::DateTime::now();
        let module = LearningModule {
            id: ObjectId::new(),
            title: req.title,
            description: req.description,
            category: req.category.unwrap_or_else(|| "general".to_string()),
            sections: req.sections,
            quiz: req.quiz,
            points: req.points.unwrap_or(20),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        collection
            .insert_one(&module)
            .await
            .context("Failed to insert module")?;

        Ok(module)
    }

    pub async fn update(&self, module_id: &str, req: UpdateModuleRequest) -> Result<LearningModule> {
        let object_id = ObjectId::parse_str(module_id).context("Invalid module ID format")?;

        let mut update_fields = Document::new();
        if let Some(title) = &req.title {
            update_fields.insert("title", title);
        }
        if let Some(description) = &req.description {
            update_fields.insert("description", description);
        }
        if let Some(category) = &req.category {
            update_fields.insert("category", category);
        }
        if let Some(sections) = &req.sections {
            update_fields.insert(
                "sections",
                mongodb::bson::to_bson(sections).context("Failed to encode sections")?,
            );
        }
        if let Some(quiz) = &req.quiz {
            update_fields.insert(
                "quiz",
                mongodb::bson::to_bson(quiz).context("Failed to encode quiz")?,
            );
        }
        if let Some(points) = req.points {
            update_fields.insert("points", points);
        }
        if let Some(is_active) = req.is_active {
            update_fields.insert("isActive", is_active);
        }
        update_fields.insert("updatedAt", bson::DateTime::now());

        if update_fields.len() <= 1 {
            return Err(anyhow!("No fields to update"));
        }

        let collection = self.mongo.collection::<LearningModule>("modules");
        let result = collection
            .update_one(doc! { "_id": object_id }, doc! { "$set": update_fields })
            .await
            .context("Failed to update module")?;

        if result.matched_count == 0 {
            return Err(anyhow!("Module not found"));
        }

        self.get(module_id).await
    }

    pub async fn delete(&self, module_id: &str) -> Result<()> {
        let object_id = ObjectId::parse_str(module_id).context("Invalid module ID format")?;

        let collection = self.mongo.collection::<LearningModule>("modules");
        let result = collection
            .delete_one(doc! { "_id": object_id })
            .await
            .context("Failed to delete module")?;

        if result.deleted_count == 0 {
            return Err(anyhow!("Module not found"));
        }

        Ok(())
    }

    /// Record a student's progress on a module.
    ///
    /// Points are credited exactly once: the student's existing progress entry
    /// is the idempotency check, so completing an already-completed module
    /// never double-credits.
    pub async fn record_progress(
        &self,
        module_id: &str,
        req: ProgressRequest,
    ) -> Result<ProgressOutcome> {
        let module = self.get(module_id).await?;
        let student_oid =
            ObjectId::parse_str(&req.student_id).context("Invalid student ID format")?;

        let users = self.mongo.collection::<User>("users");
        let student = users
            .find_one(doc! { "_id": student_oid, "role": "student" })
            .await
            .context("Failed to query student")?
            .ok_or_else(|| anyhow!("Student not found"))?;

        let module_key = module.id.to_hex();
        let already_completed = student
            .module_progress
            .get(&module_key)
            .map(|progress| progress.completed)
            .unwrap_or(false);

        let award = req.completed && !already_completed;
        let points_awarded = if award { module.points } else { 0 };

        let progress = ModuleProgress {
            completed: req.completed || already_completed,
            score: req.score,
            completed_at: if req.completed || already_completed {
                Some(chrono::Utc::now())
            } else {
                None
            },
        };
        let progress_bson =
            mongodb::bson::to_bson(&progress).context("Failed to encode progress")?;

        let mut update = doc! {
            "$set": {
                format!("moduleProgress.{}", module_key): progress_bson,
                "updatedAt": mongodb::bson::DateTime::now(),
            }
        };
        if award {
            update.insert("$inc", doc! { "totalPoints": module.points });
        }

        users
            .update_one(doc! { "_id": student_oid }, update)
            .await
            .context("Failed to record module progress")?;

        let updated = users
            .find_one(doc! { "_id": student_oid })
            .await
            .context("Failed to reload student")?
            .ok_or_else(|| anyhow!("Student not found"))?;

        Ok(ProgressOutcome {
            module_id: module_key,
            student_id: req.student_id,
            completed: req.completed || already_completed,
            points_awarded,
            total_points: updated.total_points,
        })
    }
}

/// The five built-in learning modules seeded on first read.
pub fn default_modules() -> Vec<LearningModule> {
    let now = bson::DateTime::now();
    let module = |title: &str,
                  description: &str,
                  category: &str,
                  sections: Vec<ModuleSection>,
                  quiz: Vec<QuizQuestion>,
                  points: i64| LearningModule {
        id: ObjectId::new(),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        sections,
        quiz,
        points,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let section = |title: &str, content: &str| ModuleSection {
        title: title.to_string(),
        content: content.to_string(),
    };

    let question = |q: &str, options: &[&str], correct_index: u32| QuizQuestion {
        question: q.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_index,
    };

    vec![
        module(
            "Earthquake Safety",
            "Learn how to stay safe before, during and after an earthquake.",
            "earthquake",
            vec![
                section(
                    "Drop, Cover, Hold On",
                    "When the ground starts shaking, drop to your hands and knees, take cover under a sturdy desk and hold on until the shaking stops.",
                ),
                section(
                    "After the Shaking",
                    "Move away from buildings and power lines, expect aftershocks, and follow your teacher's evacuation instructions.",
                ),
            ],
            vec![
                question(
                    "What should you do first when an earthquake starts?",
                    &["Run outside", "Drop, cover and hold on", "Stand in a doorway", "Call your parents"],
                    1,
                ),
                question(
                    "Where is the safest place during shaking in a classroom?",
                    &["Near windows", "Under a sturdy desk", "In the corridor", "On the stairs"],
                    1,
                ),
            ],
            20,
        ),
        module(
            "Fire Safety and Evacuation",
            "Understand fire hazards, evacuation routes and assembly points.",
            "fire",
            vec![
                section(
                    "Know Your Exits",
                    "Every classroom has a marked evacuation route. Walk it with your class so you can follow it calmly in smoke or darkness.",
                ),
                section(
                    "Stay Low, Move Fast",
                    "Smoke rises. If there is smoke, crawl below it, cover your nose and mouth, and never use lifts during a fire.",
                ),
            ],
            vec![
                question(
                    "During a fire you should never use:",
                    &["Stairs", "The lift", "Marked exits", "Assembly points"],
                    1,
                ),
                question(
                    "If a room fills with smoke, you should:",
                    &["Stand tall and run", "Crawl low under the smoke", "Open all windows", "Hide in a cupboard"],
                    1,
                ),
            ],
            15,
        ),
        module(
            "Flood Preparedness",
            "Recognise flood warnings and know how to reach higher ground.",
            "flood",
            vec![
                section(
                    "Warning Signs",
                    "Heavy continuous rain, rising water levels and official alerts mean a flood may be coming. Move valuables and people to higher floors.",
                ),
                section(
                    "Never Walk in Floodwater",
                    "Fifteen centimetres of moving water can knock you over. Stay out of drains and away from riverbanks.",
                ),
            ],
            vec![
                question(
                    "During a flood warning the safest place is:",
                    &["The basement", "Higher ground", "Near the river", "Inside a car"],
                    1,
                ),
            ],
            20,
        ),
        module(
            "Cyclone Awareness",
            "Prepare for high winds, storm surges and power cuts.",
            "cyclone",
            vec![
                section(
                    "Before the Storm",
                    "Secure loose objects, stock drinking water and torches, and stay tuned to official weather bulletins.",
                ),
                section(
                    "During the Storm",
                    "Stay indoors away from windows. The calm eye of the cyclone does not mean the storm is over.",
                ),
            ],
            vec![
                question(
                    "When the eye of a cyclone passes over, you should:",
                    &["Go outside to inspect damage", "Stay indoors, the storm will return", "Swim in the floodwater", "Climb onto the roof"],
                    1,
                ),
            ],
            15,
        ),
        module(
            "First Aid Basics",
            "Essential first aid every student should know.",
            "first-aid",
            vec![
                section(
                    "Check, Call, Care",
                    "Check the scene is safe, call for adult help and emergency services, then care for the injured person without moving them unnecessarily.",
                ),
                section(
                    "Bleeding and Burns",
                    "Press a clean cloth firmly on bleeding wounds. Cool burns under running water for twenty minutes; never apply ice or butter.",
                ),
            ],
            vec![
                question(
                    "The first step at any emergency scene is to:",
                    &["Move the injured person", "Check that the scene is safe", "Take photos", "Apply a bandage"],
                    1,
                ),
                question(
                    "A minor burn should be treated with:",
                    &["Ice cubes", "Butter", "Cool running water", "A tight bandage"],
                    2,
                ),
            ],
            25,
        ),
    ]
}
